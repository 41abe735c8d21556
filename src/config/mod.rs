//! Configuration management for Lumen reader

pub mod file;

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::nlp::SummaryBounds;
use crate::{Error, Language, Result};

/// Default upload limit in megabytes
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;

/// Default reachability probe target (public DNS over TCP)
pub const DEFAULT_PROBE_ADDR: &str = "8.8.8.8:53";

/// Browser-like User-Agent; many sites refuse obvious bots
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Lumen reader configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Upload limits
    pub limits: LimitsConfig,

    /// Network probe and fetch configuration
    pub network: NetworkConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Summarization and translation configuration
    pub nlp: NlpConfig,

    /// OCR configuration
    pub ocr: OcrConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Upload limits
#[derive(Debug, Clone, Copy)]
pub struct LimitsConfig {
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
}

/// Network configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Address dialed by the reachability probe
    pub probe_addr: String,

    /// Upper bound on a single probe
    pub probe_timeout: Duration,

    /// Upper bound on a page fetch
    pub fetch_timeout: Duration,

    /// User-Agent sent when fetching pages
    pub user_agent: String,
}

/// Online TTS provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsProviderKind {
    /// Google Translate speech endpoint (no key, many languages)
    Google,
    /// `OpenAI` speech API
    OpenAI,
}

impl FromStr for TtsProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gtts" => Ok(Self::Google),
            "openai" => Ok(Self::OpenAI),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// How long to wait for speech to start
    pub listen_timeout: Duration,

    /// Longest utterance captured
    pub phrase_limit: Duration,

    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// Online TTS provider
    pub tts_provider: TtsProviderKind,

    /// TTS model for `OpenAI` (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice for `OpenAI` (e.g. "alloy")
    pub tts_voice: String,

    /// Offline engine binary
    pub offline_engine: String,

    /// Offline speaking rate in words per minute
    pub offline_rate_wpm: u32,

    /// Speak non-English text with the offline English voice when offline
    pub degrade_to_english: bool,
}

/// Summarization and translation configuration
#[derive(Debug, Clone)]
pub struct NlpConfig {
    /// Base URL of the inference endpoint
    pub inference_url: String,

    /// Summarization model identifier
    pub summarizer_model: String,

    /// Translation model per target language
    pub translation_models: HashMap<Language, String>,

    /// Input token budget for translation
    pub translation_max_tokens: usize,

    /// Texts shorter than this many words are not summarized
    pub summary_min_words: usize,

    /// Summary length bounds
    pub summary_bounds: SummaryBounds,

    /// Inference request timeout
    pub timeout: Duration,
}

/// OCR configuration
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path or name of the tesseract binary
    pub tesseract_cmd: String,

    /// Tesseract language pack
    pub language: String,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper STT, optional TTS)
    pub openai: Option<SecretString>,

    /// Hugging Face token for the inference API
    pub huggingface: Option<SecretString>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 18800,
            },
            limits: LimitsConfig {
                max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            },
            network: NetworkConfig {
                probe_addr: DEFAULT_PROBE_ADDR.to_string(),
                probe_timeout: Duration::from_secs(3),
                fetch_timeout: Duration::from_secs(10),
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            voice: VoiceConfig {
                listen_timeout: Duration::from_secs(5),
                phrase_limit: Duration::from_secs(15),
                stt_model: "whisper-1".to_string(),
                tts_provider: TtsProviderKind::Google,
                tts_model: "tts-1".to_string(),
                tts_voice: "alloy".to_string(),
                offline_engine: "espeak-ng".to_string(),
                offline_rate_wpm: 160,
                degrade_to_english: true,
            },
            nlp: NlpConfig {
                inference_url: "https://api-inference.huggingface.co".to_string(),
                summarizer_model: "facebook/bart-large-cnn".to_string(),
                translation_models: default_translation_models(),
                translation_max_tokens: 512,
                summary_min_words: 50,
                summary_bounds: SummaryBounds::default(),
                timeout: Duration::from_secs(60),
            },
            ocr: OcrConfig {
                tesseract_cmd: "tesseract".to_string(),
                language: "eng".to_string(),
            },
            api_keys: ApiKeys::default(),
        }
    }
}

/// English-source Marian models for each supported target
fn default_translation_models() -> HashMap<Language, String> {
    [
        (Language::Hindi, "Helsinki-NLP/opus-mt-en-hi"),
        (Language::French, "Helsinki-NLP/opus-mt-en-fr"),
        (Language::German, "Helsinki-NLP/opus-mt-en-de"),
    ]
    .into_iter()
    .map(|(lang, model)| (lang, model.to_string()))
    .collect()
}

impl Config {
    /// Load configuration from the environment and the optional TOML file
    ///
    /// Precedence is env > toml > default.
    ///
    /// # Errors
    ///
    /// Returns error if a value is malformed or the result is inconsistent
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a value is malformed or the result is inconsistent
    pub fn from_sources<F>(fc: file::LumenConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server = ServerConfig {
            host: env("LUMEN_HOST")
                .or(fc.server.host)
                .unwrap_or(defaults.server.host),
            port: parse_env(&env, "LUMEN_PORT")?
                .or(fc.server.port)
                .unwrap_or(defaults.server.port),
        };

        let max_upload_mb = parse_env(&env, "LUMEN_MAX_UPLOAD_MB")?
            .or(fc.limits.max_upload_mb)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);
        let limits = LimitsConfig {
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
        };

        let network = NetworkConfig {
            probe_addr: env("LUMEN_PROBE_ADDR")
                .or(fc.network.probe_addr)
                .unwrap_or(defaults.network.probe_addr),
            probe_timeout: parse_env(&env, "LUMEN_PROBE_TIMEOUT_SECS")?
                .or(fc.network.probe_timeout_secs)
                .map_or(defaults.network.probe_timeout, Duration::from_secs),
            fetch_timeout: parse_env(&env, "LUMEN_FETCH_TIMEOUT_SECS")?
                .or(fc.network.fetch_timeout_secs)
                .map_or(defaults.network.fetch_timeout, Duration::from_secs),
            user_agent: fc.network.user_agent.unwrap_or(defaults.network.user_agent),
        };

        let tts_provider = match env("LUMEN_TTS_PROVIDER").or(fc.voice.tts_provider) {
            Some(name) => name.parse()?,
            None => defaults.voice.tts_provider,
        };
        let voice = VoiceConfig {
            listen_timeout: parse_env(&env, "LUMEN_LISTEN_TIMEOUT_SECS")?
                .or(fc.voice.listen_timeout_secs)
                .map_or(defaults.voice.listen_timeout, Duration::from_secs),
            phrase_limit: fc
                .voice
                .phrase_limit_secs
                .map_or(defaults.voice.phrase_limit, Duration::from_secs),
            stt_model: env("LUMEN_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or(defaults.voice.stt_model),
            tts_provider,
            tts_model: env("LUMEN_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or(defaults.voice.tts_model),
            tts_voice: env("LUMEN_TTS_VOICE")
                .or(fc.voice.tts_voice)
                .unwrap_or(defaults.voice.tts_voice),
            offline_engine: env("LUMEN_OFFLINE_ENGINE")
                .or(fc.voice.offline_engine)
                .unwrap_or(defaults.voice.offline_engine),
            offline_rate_wpm: fc
                .voice
                .offline_rate_wpm
                .unwrap_or(defaults.voice.offline_rate_wpm),
            degrade_to_english: env("LUMEN_DEGRADE_TO_ENGLISH")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .or(fc.voice.degrade_to_english)
                .unwrap_or(defaults.voice.degrade_to_english),
        };

        let mut translation_models = defaults.nlp.translation_models;
        if let Some(overrides) = fc.nlp.translation_models {
            // An explicit table replaces the defaults so languages can be switched off
            translation_models = overrides;
        }
        translation_models.remove(&Language::English);

        let summary_bounds = SummaryBounds {
            min_length: fc
                .nlp
                .summary_min_length
                .unwrap_or(defaults.nlp.summary_bounds.min_length),
            max_length: fc
                .nlp
                .summary_max_length
                .unwrap_or(defaults.nlp.summary_bounds.max_length),
        };

        let nlp = NlpConfig {
            inference_url: env("LUMEN_INFERENCE_URL")
                .or(fc.nlp.inference_url)
                .unwrap_or(defaults.nlp.inference_url),
            summarizer_model: env("LUMEN_SUMMARIZER_MODEL")
                .or(fc.nlp.summarizer_model)
                .unwrap_or(defaults.nlp.summarizer_model),
            translation_models,
            translation_max_tokens: fc
                .nlp
                .translation_max_tokens
                .unwrap_or(defaults.nlp.translation_max_tokens),
            summary_min_words: fc
                .nlp
                .summary_min_words
                .unwrap_or(defaults.nlp.summary_min_words),
            summary_bounds,
            timeout: fc
                .nlp
                .timeout_secs
                .map_or(defaults.nlp.timeout, Duration::from_secs),
        };

        let ocr = OcrConfig {
            tesseract_cmd: env("LUMEN_TESSERACT_CMD")
                .or(fc.ocr.tesseract_cmd)
                .unwrap_or(defaults.ocr.tesseract_cmd),
            language: fc.ocr.language.unwrap_or(defaults.ocr.language),
        };

        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
            huggingface: env("HF_API_TOKEN")
                .or(fc.api_keys.huggingface)
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
        };

        let config = Self {
            server,
            limits,
            network,
            voice,
            nlp,
            ocr,
            api_keys,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants
    ///
    /// # Errors
    ///
    /// Returns error describing the first violated constraint
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_upload_bytes == 0 {
            return Err(Error::Config("max upload size must be positive".to_string()));
        }
        if self.network.probe_timeout.is_zero() || self.network.fetch_timeout.is_zero() {
            return Err(Error::Config("network timeouts must be positive".to_string()));
        }
        if self.voice.listen_timeout.is_zero() {
            return Err(Error::Config("listen timeout must be positive".to_string()));
        }
        let bounds = self.nlp.summary_bounds;
        if bounds.min_length == 0 || bounds.min_length > bounds.max_length {
            return Err(Error::Config(format!(
                "summary bounds must satisfy 0 < min <= max (got {}..{})",
                bounds.min_length, bounds.max_length
            )));
        }
        if self.nlp.translation_max_tokens == 0 {
            return Err(Error::Config("translation token budget must be positive".to_string()));
        }
        if self.voice.tts_provider == TtsProviderKind::OpenAI && self.api_keys.openai.is_none() {
            return Err(Error::Config(
                "OpenAI API key required for the openai TTS provider".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse an optional numeric environment variable
fn parse_env<T, F>(env: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| Error::Config(format!("{key} has an invalid value: {raw}")))
        })
        .transpose()
}
