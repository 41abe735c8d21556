//! Summarization gate

use super::{SummaryBounds, Summarizer, word_count};
use crate::advisory::{Advisory, AdvisoryKind, Outcome};
use crate::backends::Backends;

/// Summarize `text` if it is long enough to be worth it
///
/// Short texts pass through with an info advisory. Model failures and empty
/// summaries fall back to the original text.
pub async fn maybe_summarize(backends: &Backends, text: &str) -> Outcome<String> {
    let policy = &backends.policy;
    gate(
        backends.summarizer.as_ref(),
        text,
        policy.summary_min_words,
        policy.summary_bounds,
    )
    .await
}

async fn gate(
    summarizer: &dyn Summarizer,
    text: &str,
    min_words: usize,
    bounds: SummaryBounds,
) -> Outcome<String> {
    let words = word_count(text);
    if words < min_words {
        tracing::debug!(words, min_words, "text too short to summarize");
        return Outcome::advised(
            text.to_string(),
            Advisory::info(
                AdvisoryKind::TextTooShort,
                format!(
                    "Text has {words} words; summaries need at least {min_words}. Showing it unchanged."
                ),
            ),
        );
    }

    match summarizer.summarize(text, bounds).await {
        Ok(summary) if !summary.trim().is_empty() => {
            tracing::info!(words, summary_words = word_count(&summary), "text summarized");
            Outcome::clean(summary.trim().to_string())
        }
        Ok(_) => {
            tracing::warn!("summarizer returned empty output, keeping original");
            Outcome::advised(
                text.to_string(),
                Advisory::error(
                    AdvisoryKind::ModelInferenceError,
                    "The summarizer produced no output. Showing the original text.",
                ),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "summarization failed, keeping original");
            Outcome::advised(text.to_string(), Advisory::from_error(&e))
        }
    }
}
