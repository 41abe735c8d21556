//! Target language resolution
//!
//! The set of languages is closed. Anything the user asks for that is not in
//! it falls back to English with an advisory.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::advisory::{Advisory, AdvisoryKind};

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
}

impl Language {
    pub const ALL: [Self; 4] = [Self::English, Self::Hindi, Self::French, Self::German];

    /// ISO 639-1 code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::French => "fr",
            Self::German => "de",
        }
    }

    /// English name of the language
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::French => "French",
            Self::German => "German",
        }
    }

    #[must_use]
    pub const fn is_english(self) -> bool {
        matches!(self, Self::English)
    }

    /// Look up a language by its ISO code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of resolving free-form user input to a language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageResolution {
    pub language: Language,
    pub advisory: Option<Advisory>,
}

/// Resolve a spoken or typed language name
///
/// Matching is case-insensitive on trimmed input. Unknown names resolve to
/// English and carry an advisory; this never fails.
#[must_use]
pub fn resolve_language(input: &str) -> LanguageResolution {
    let normalized = input.trim().to_lowercase();

    if normalized.is_empty() {
        return LanguageResolution {
            language: Language::English,
            advisory: None,
        };
    }

    if let Some(language) =
        Language::from_name(&normalized).or_else(|| Language::from_code(&normalized))
    {
        return LanguageResolution {
            language,
            advisory: None,
        };
    }

    tracing::debug!(input = %input.trim(), "unsupported language requested");
    LanguageResolution {
        language: Language::English,
        advisory: Some(Advisory::warning(
            AdvisoryKind::UnsupportedLanguage,
            format!(
                "Language '{}' is not supported for translation. Defaulting to English (no translation).",
                input.trim()
            ),
        )),
    }
}
