//! User-visible advisories attached to degraded outcomes
//!
//! Every fallback in the pipeline records why it happened. The caller shows
//! these messages alongside whatever value survived.

use serde::Serialize;

use crate::Error;

/// Category of an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    UnsupportedFormat,
    FileTooLarge,
    ParseError,
    NetworkUnavailable,
    HttpError,
    ConnectionError,
    TimeoutError,
    InvalidUrl,
    OcrEngineMissing,
    OcrError,
    SpeechRecognitionTimeout,
    SpeechUnrecognized,
    SpeechServiceUnavailable,
    AudioDevice,
    ModelInferenceError,
    UnsupportedOfflineLanguage,
    SynthesisFailed,
    UnsupportedLanguage,
    TextTooShort,
    ReducedVoiceFidelity,
    NoContent,
    CommandNotRecognized,
    Internal,
}

/// How prominently an advisory should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A non-fatal message accompanying an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub severity: Severity,
    pub message: String,
}

impl Advisory {
    #[must_use]
    pub fn info(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Build an error advisory from a failed delegated call
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        let message = match err {
            Error::HttpStatus { status: 403, .. } => {
                "This website doesn't allow extracting its content (HTTP 403 Forbidden). Try another website.".to_string()
            }
            Error::OcrEngineMissing(_) => format!(
                "{err}. Install Tesseract and make sure it is on PATH or set ocr.tesseract_cmd."
            ),
            Error::SpeechServiceUnavailable(_) => {
                format!("{err}. Check your internet connection or API limits.")
            }
            _ => err.to_string(),
        };
        Self::error(err.kind(), message)
    }
}

/// A value together with the advisories produced while computing it
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub advisories: Vec<Advisory>,
}

impl<T> Outcome<T> {
    /// Outcome with no advisories
    pub const fn clean(value: T) -> Self {
        Self {
            value,
            advisories: Vec::new(),
        }
    }

    /// Outcome carrying a single advisory
    pub fn advised(value: T, advisory: Advisory) -> Self {
        Self {
            value,
            advisories: vec![advisory],
        }
    }

    /// Whether any advisory is at error severity
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.advisories.iter().any(|a| a.severity == Severity::Error)
    }

    /// Whether an advisory of the given kind was produced
    #[must_use]
    pub fn has(&self, kind: AdvisoryKind) -> bool {
        self.advisories.iter().any(|a| a.kind == kind)
    }
}
