//! Summarization and translation
//!
//! Two gates sit in front of the model seams. Each decides whether a model
//! call is needed at all and falls back to the input text when the model
//! fails, so neither gate can lose the user's content.

mod inference;
mod summarize;
mod translate;

use async_trait::async_trait;

pub use inference::InferenceClient;
pub use summarize::maybe_summarize;
pub use translate::{maybe_translate, truncate_tokens};

use crate::{Language, Result};

/// Output length bounds passed to the summarizer, in model tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    pub min_length: u32,
    pub max_length: u32,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_length: 50,
            max_length: 150,
        }
    }
}

/// Condenses English text
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize with greedy (non-sampling) decoding
    ///
    /// # Errors
    ///
    /// Returns `Model` if inference fails
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String>;
}

/// Translates English text into a target language
#[async_trait]
pub trait Translator: Send + Sync {
    /// Whether a model exists for the target
    fn supports(&self, language: Language) -> bool;

    /// # Errors
    ///
    /// Returns `Model` if inference fails
    async fn translate(&self, text: &str, target: Language) -> Result<String>;
}

/// Count whitespace-separated words
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
