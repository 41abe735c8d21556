//! Offline text-to-speech through a local engine

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::artifact::{AudioArtifact, AudioFormat};
use crate::{Error, Language, Result};

/// Engine binaries tried when the configured one is not installed
const FALLBACK_ENGINES: [&str; 2] = ["espeak-ng", "espeak"];

/// Renders English text without network access
#[async_trait]
pub trait OfflineSynthesizer: Send + Sync {
    /// # Errors
    ///
    /// Returns `UnsupportedOfflineLanguage` for anything but English,
    /// `Synthesis` if the engine fails
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioArtifact>;

    /// Engine name for logging
    fn name(&self) -> &'static str;
}

/// eSpeak NG command-line engine writing WAV output
pub struct EspeakSynthesizer {
    command: String,
    rate_wpm: u32,
}

impl EspeakSynthesizer {
    #[must_use]
    pub fn new(command: &str, rate_wpm: u32) -> Self {
        Self {
            command: command.to_string(),
            rate_wpm,
        }
    }

    fn locate(&self) -> Result<std::path::PathBuf> {
        std::iter::once(self.command.as_str())
            .chain(FALLBACK_ENGINES)
            .find_map(|cmd| which::which(cmd).ok())
            .ok_or_else(|| {
                Error::Synthesis(format!(
                    "offline speech engine not found ({}); install espeak-ng",
                    self.command
                ))
            })
    }
}

#[async_trait]
impl OfflineSynthesizer for EspeakSynthesizer {
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioArtifact> {
        if !language.is_english() {
            return Err(Error::UnsupportedOfflineLanguage(language));
        }

        let engine = self.locate()?;
        let artifact = AudioArtifact::empty(AudioFormat::Wav)?;

        tracing::debug!(engine = %engine.display(), chars = text.len(), "offline tts");

        let mut child = Command::new(&engine)
            .args(["-v", "en", "-s", &self.rate_wpm.to_string(), "--stdin", "-w"])
            .arg(artifact.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Synthesis(format!("failed to start {}: {e}", engine.display())))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Synthesis(format!(
                "offline engine exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(artifact)
    }

    fn name(&self) -> &'static str {
        "espeak"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_english() {
        let engine = EspeakSynthesizer::new("espeak-ng", 160);
        for language in [Language::Hindi, Language::French, Language::German] {
            let err = engine.synthesize("Bonjour", language).await.unwrap_err();
            assert!(matches!(err, Error::UnsupportedOfflineLanguage(l) if l == language));
        }
    }
}
