//! Image OCR via the tesseract CLI

use std::io::Write;

use async_trait::async_trait;
use tokio::process::Command;

use super::DocumentExtractor;
use crate::{Error, Result};

/// Runs tesseract over an uploaded image
pub struct OcrExtractor {
    command: String,
    language: String,
}

impl OcrExtractor {
    #[must_use]
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            command: command.to_string(),
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl DocumentExtractor for OcrExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let binary = which::which(&self.command)
            .map_err(|e| Error::OcrEngineMissing(format!("{}: {e}", self.command)))?;

        let mut image = tempfile::Builder::new().prefix("lumen-ocr-").tempfile()?;
        image.write_all(bytes)?;
        image.flush()?;

        tracing::debug!(engine = %binary.display(), bytes = bytes.len(), "running ocr");

        let output = Command::new(&binary)
            .arg(image.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Ocr(format!("failed to start {}: {e}", binary.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}
