//! Speech backend selection
//!
//! Each request probes the network and builds an ordered list of backends to
//! try. Nothing about a previous request influences the next one.

use serde::Serialize;

use super::artifact::AudioArtifact;
use crate::advisory::{Advisory, AdvisoryKind, Outcome};
use crate::backends::Backends;
use crate::{Error, Language, Result};

/// Where speech is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeechBackendChoice {
    /// Network service speaking `language`
    Network { language: Language },
    /// Local engine, English only
    Offline,
}

impl SpeechBackendChoice {
    /// Language the backend will actually speak
    #[must_use]
    pub const fn rendered_language(self) -> Language {
        match self {
            Self::Network { language } => language,
            Self::Offline => Language::English,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Offline => "offline",
        }
    }
}

/// Audio produced for a request
#[derive(Debug)]
pub struct SynthesizedSpeech {
    pub artifact: AudioArtifact,
    pub backend: SpeechBackendChoice,
    /// Language actually rendered, which may differ from the one requested
    pub language: Language,
}

/// Ordered backend candidates for a language and reachability
///
/// # Errors
///
/// Returns `UnsupportedOfflineLanguage` when the network is down and the
/// language is not English
pub fn plan_synthesis(language: Language, reachable: bool) -> Result<Vec<SpeechBackendChoice>> {
    match (language.is_english(), reachable) {
        (true, true) => Ok(vec![
            SpeechBackendChoice::Network { language },
            SpeechBackendChoice::Offline,
        ]),
        (true, false) => Ok(vec![SpeechBackendChoice::Offline]),
        (false, true) => Ok(vec![SpeechBackendChoice::Network { language }]),
        (false, false) => Err(Error::UnsupportedOfflineLanguage(language)),
    }
}

/// Render `text` as speech in `language`, falling back where allowed
///
/// When offline with a non-English language and degradation enabled, the
/// text is spoken by the English offline voice and the audio is labelled
/// English.
pub async fn synthesize_speech(
    backends: &Backends,
    text: &str,
    language: Language,
) -> Outcome<Option<SynthesizedSpeech>> {
    if text.trim().is_empty() {
        return Outcome::advised(
            None,
            Advisory::warning(AdvisoryKind::NoContent, "There is no text to read aloud."),
        );
    }

    let reachable = backends.probe.is_reachable().await;
    let mut advisories = Vec::new();

    let language = if !reachable
        && !language.is_english()
        && backends.policy.degrade_offline_to_english
    {
        tracing::warn!(requested = language.code(), "offline, degrading speech to English");
        advisories.push(Advisory::warning(
            AdvisoryKind::ReducedVoiceFidelity,
            format!(
                "No internet connection. {language} speech needs the network, so the offline English voice is used instead."
            ),
        ));
        Language::English
    } else {
        language
    };

    let plan = match plan_synthesis(language, reachable) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::warn!(error = %e, "no speech backend available");
            advisories.push(Advisory::from_error(&e));
            return Outcome {
                value: None,
                advisories,
            };
        }
    };

    let candidates = plan.len();
    for (idx, choice) in plan.into_iter().enumerate() {
        let result = match choice {
            SpeechBackendChoice::Network { language } => {
                backends.online_tts.synthesize(text, language).await
            }
            SpeechBackendChoice::Offline => {
                backends.offline_tts.synthesize(text, Language::English).await
            }
        };

        match result {
            Ok(artifact) => {
                tracing::info!(
                    backend = choice.label(),
                    language = choice.rendered_language().code(),
                    "speech synthesized"
                );
                return Outcome {
                    value: Some(SynthesizedSpeech {
                        artifact,
                        backend: choice,
                        language: choice.rendered_language(),
                    }),
                    advisories,
                };
            }
            Err(e) if idx + 1 < candidates => {
                tracing::warn!(
                    backend = choice.label(),
                    error = %e,
                    "speech backend failed, trying next"
                );
                advisories.push(Advisory::warning(
                    e.kind(),
                    format!("Online speech failed ({e}). Using the offline voice."),
                ));
            }
            Err(e) => {
                tracing::warn!(backend = choice.label(), error = %e, "speech synthesis failed");
                advisories.push(Advisory::from_error(&e));
            }
        }
    }

    Outcome {
        value: None,
        advisories,
    }
}
