//! Error types for Lumen reader

use thiserror::Error;

use crate::advisory::AdvisoryKind;
use crate::language::Language;

/// Result type alias for Lumen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Lumen reader
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// File extension outside the supported set
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Upload exceeds the configured size limit
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// Document could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Reachability probe failed before a network operation
    #[error("no internet connection available")]
    NetworkUnavailable,

    /// Remote server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Could not connect to a remote host
    #[error("connection error: {0}")]
    Connection(String),

    /// Remote operation exceeded its deadline
    #[error("timed out: {0}")]
    Timeout(String),

    /// URL rejected before any request was made
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// OCR engine binary not installed
    #[error("OCR engine not found: {0}")]
    OcrEngineMissing(String),

    /// OCR engine ran but failed
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Nothing was said before the listen timeout
    #[error("no speech detected within {0} seconds")]
    SpeechTimeout(u64),

    /// Audio was captured but no words were recognized
    #[error("speech could not be recognized")]
    SpeechUnrecognized,

    /// Speech recognition backend unreachable or misconfigured
    #[error("speech recognition service unavailable: {0}")]
    SpeechServiceUnavailable(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Translation or summarization model failed
    #[error("model inference error: {0}")]
    Model(String),

    /// Offline engine asked to render a language it cannot speak
    #[error("offline speech does not support {0}")]
    UnsupportedOfflineLanguage(Language),

    /// Text-to-speech backend failed
    #[error("speech synthesis error: {0}")]
    Synthesis(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Map this error onto the user-facing advisory taxonomy
    #[must_use]
    pub fn kind(&self) -> AdvisoryKind {
        match self {
            Self::UnsupportedFormat(_) => AdvisoryKind::UnsupportedFormat,
            Self::FileTooLarge { .. } => AdvisoryKind::FileTooLarge,
            Self::Parse(_) => AdvisoryKind::ParseError,
            Self::NetworkUnavailable => AdvisoryKind::NetworkUnavailable,
            Self::HttpStatus { .. } => AdvisoryKind::HttpError,
            Self::Connection(_) => AdvisoryKind::ConnectionError,
            Self::Timeout(_) => AdvisoryKind::TimeoutError,
            Self::InvalidUrl(_) => AdvisoryKind::InvalidUrl,
            Self::OcrEngineMissing(_) => AdvisoryKind::OcrEngineMissing,
            Self::Ocr(_) => AdvisoryKind::OcrError,
            Self::SpeechTimeout(_) => AdvisoryKind::SpeechRecognitionTimeout,
            Self::SpeechUnrecognized => AdvisoryKind::SpeechUnrecognized,
            Self::SpeechServiceUnavailable(_) => AdvisoryKind::SpeechServiceUnavailable,
            Self::Audio(_) => AdvisoryKind::AudioDevice,
            Self::Model(_) => AdvisoryKind::ModelInferenceError,
            Self::UnsupportedOfflineLanguage(_) => AdvisoryKind::UnsupportedOfflineLanguage,
            Self::Synthesis(_) => AdvisoryKind::SynthesisFailed,
            Self::Http(e) if e.is_timeout() => AdvisoryKind::TimeoutError,
            Self::Http(e) if e.status().is_some() => AdvisoryKind::HttpError,
            Self::Http(_) => AdvisoryKind::ConnectionError,
            Self::Config(_) | Self::Io(_) | Self::Serialization(_) | Self::Toml(_) => {
                AdvisoryKind::Internal
            }
        }
    }

    /// Classify a reqwest failure from a page fetch
    #[must_use]
    pub fn from_fetch(err: &reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("request to {url} took too long"))
        } else if err.is_redirect() {
            Self::InvalidUrl(format!("{url} redirects to a refused or looping target"))
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            Self::Connection(format!("could not connect to {url}: {err}"))
        }
    }
}
