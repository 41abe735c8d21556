//! Synthesized audio held in a temporary file

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::Result;

/// Encoding of an audio artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => ".mp3",
            Self::Wav => ".wav",
        }
    }
}

/// Audio written to a process-local temporary file
///
/// The file is removed when the artifact is dropped.
#[derive(Debug)]
pub struct AudioArtifact {
    file: NamedTempFile,
    format: AudioFormat,
}

impl AudioArtifact {
    /// Create an empty artifact file for an engine to write into
    ///
    /// # Errors
    ///
    /// Returns error if the temporary file cannot be created
    pub fn empty(format: AudioFormat) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("lumen-speech-")
            .suffix(format.extension())
            .tempfile()?;
        Ok(Self { file, format })
    }

    /// Write encoded audio bytes to a new artifact
    ///
    /// # Errors
    ///
    /// Returns error if the temporary file cannot be written
    pub fn from_bytes(bytes: &[u8], format: AudioFormat) -> Result<Self> {
        let mut artifact = Self::empty(format)?;
        artifact.file.write_all(bytes)?;
        artifact.file.flush()?;
        Ok(artifact)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    #[must_use]
    pub const fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// Read the encoded audio back
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.path()).await?)
    }
}
