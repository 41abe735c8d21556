//! Translation gate

use super::Translator;
use crate::advisory::{Advisory, AdvisoryKind, Outcome};
use crate::backends::Backends;
use crate::Language;

/// Translate `text` into `target` when a model is available
///
/// English is the identity. Input longer than the token budget is cut to
/// its first `translation_max_tokens` whitespace tokens before the call.
pub async fn maybe_translate(backends: &Backends, text: &str, target: Language) -> Outcome<String> {
    gate(
        backends.translator.as_ref(),
        text,
        target,
        backends.policy.translation_max_tokens,
    )
    .await
}

async fn gate(
    translator: &dyn Translator,
    text: &str,
    target: Language,
    max_tokens: usize,
) -> Outcome<String> {
    if target.is_english() {
        return Outcome::clean(text.to_string());
    }

    if !translator.supports(target) {
        tracing::warn!(language = target.code(), "no translation model configured");
        return Outcome::advised(
            text.to_string(),
            Advisory::warning(
                AdvisoryKind::UnsupportedLanguage,
                format!("Translation to {target} is not available. Showing the original text."),
            ),
        );
    }

    let input = truncate_tokens(text, max_tokens);
    if input.len() < text.len() {
        tracing::debug!(max_tokens, "translation input truncated");
    }

    match translator.translate(&input, target).await {
        Ok(translated) if !translated.trim().is_empty() => {
            tracing::info!(language = target.code(), "text translated");
            Outcome::clean(translated.trim().to_string())
        }
        Ok(_) => {
            tracing::warn!(language = target.code(), "translator returned empty output");
            Outcome::advised(
                text.to_string(),
                Advisory::error(
                    AdvisoryKind::ModelInferenceError,
                    format!(
                        "Translation to {target} produced no output. Showing the original text."
                    ),
                ),
            )
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                language = target.code(),
                "translation failed, keeping original"
            );
            Outcome::advised(text.to_string(), Advisory::from_error(&e))
        }
    }
}

/// Keep at most `max_tokens` whitespace-separated tokens
///
/// Text already within budget is returned unchanged.
#[must_use]
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    if super::word_count(text) <= max_tokens {
        return text.to_string();
    }
    text.split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}
