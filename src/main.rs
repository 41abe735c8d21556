use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lumen_reader::api::ApiServer;
use lumen_reader::voice::{AudioCapture, AudioPlayback, DecodedAudio, SpeechRecognizer};
use lumen_reader::{Advisory, Backends, Config, ContentSource, Session, Severity};

/// Lumen - read documents, web pages and text aloud
#[derive(Parser)]
#[command(name = "lumen", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind
        #[arg(long, env = "LUMEN_HOST")]
        host: Option<String>,
        /// Port to listen on
        #[arg(long, env = "LUMEN_PORT")]
        port: Option<u16>,
    },
    /// Acquire content and process it in one pass
    Read(ReadArgs),
    /// Listen for one utterance and print the transcript
    Listen,
    /// Report whether the network is reachable
    Probe,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
}

#[derive(Args)]
struct ReadArgs {
    /// Document to read (pdf, docx, epub, txt, jpg, jpeg, png)
    #[arg(conflicts_with_all = ["url", "text"], required_unless_present_any = ["url", "text"])]
    path: Option<PathBuf>,

    /// Web page to read
    #[arg(long, conflicts_with = "text")]
    url: Option<String>,

    /// Text to read
    #[arg(long)]
    text: Option<String>,

    /// Override the file type instead of using the extension
    #[arg(long = "type", requires = "path")]
    file_type: Option<String>,

    /// Summarize before output
    #[arg(long)]
    summarize: bool,

    /// Translate into this language (name or code)
    #[arg(long)]
    translate: Option<String>,

    /// Speak the result through the local speakers
    #[arg(long)]
    speak: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,lumen_reader=info",
        1 => "info,lumen_reader=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Read(args) => read(&config, args).await,
        Command::Listen => listen(&config).await,
        Command::Probe => probe(&config).await,
        Command::TestMic { duration } => test_mic(duration).await,
        Command::TestSpeaker => test_speaker().await,
    }
}

async fn serve(config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    let backends = Arc::new(Backends::from_config(&config)?);

    tracing::info!(%addr, "lumen reader ready, open http://{addr}/");
    ApiServer::new(backends, addr).run().await?;
    Ok(())
}

async fn read(config: &Config, args: ReadArgs) -> anyhow::Result<()> {
    let backends = Backends::from_config(config)?;
    let mut session = Session::new();

    let source = if let Some(path) = &args.path {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ContentSource::upload(&name, bytes)
    } else if let Some(url) = args.url {
        ContentSource::RemoteUrl(url)
    } else {
        ContentSource::RawText(args.text.unwrap_or_default())
    };

    let report = session
        .load(&backends, &source, args.file_type.as_deref())
        .await;
    print_advisories(&report.advisories);

    if args.summarize {
        let report = session.summarize(&backends).await;
        print_advisories(&report.advisories);
    }

    if let Some(language) = &args.translate {
        let report = session.translate(&backends, language).await;
        print_advisories(&report.advisories);
    }

    println!("{}", session.processed());

    if args.speak {
        let report = session.speak(&backends).await;
        print_advisories(&report.advisories);

        if let Some(speech) = report.audio {
            eprintln!(
                "speaking ({}, {})",
                speech.backend.label(),
                speech.language.name()
            );
            tokio::task::spawn_blocking(move || {
                AudioPlayback::new()?.play_artifact(&speech.artifact)
            })
            .await??;
        }
    }

    Ok(())
}

fn print_advisories(advisories: &[Advisory]) {
    for advisory in advisories {
        let label = match advisory.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        eprintln!("[{label}] {}", advisory.message);
    }
}

async fn listen(config: &Config) -> anyhow::Result<()> {
    let backends = Backends::from_config(config)?;
    eprintln!("Listening... please speak now.");

    let transcript = backends
        .recognizer
        .listen(backends.policy.listen_timeout)
        .await?;
    println!("{transcript}");
    Ok(())
}

async fn probe(config: &Config) -> anyhow::Result<()> {
    let backends = Backends::from_config(config)?;
    if backends.probe.is_reachable().await {
        println!("online");
    } else {
        println!("offline");
    }
    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    let sample_rate = capture.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let sample_rate = 24000_u32;
    let frequency = 440.0_f32;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);

    let audio = DecodedAudio {
        samples,
        sample_rate,
    };
    tokio::task::spawn_blocking(move || AudioPlayback::new()?.play(&audio)).await??;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Try: speaker-test -t sine -f 440 -l 1");

    Ok(())
}
