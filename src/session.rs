//! Per-user pipeline state
//!
//! A session holds the acquired text and what has been done to it. Each
//! action runs one pipeline to completion and reports the current text
//! together with every advisory raised along the way.

use crate::acquire::{ContentSource, resolve};
use crate::advisory::{Advisory, AdvisoryKind};
use crate::backends::Backends;
use crate::language::resolve_language;
use crate::nlp::{maybe_summarize, maybe_translate};
use crate::voice::{SynthesizedSpeech, VoiceCommand, synthesize_speech};
use crate::Language;

/// Result of one user action
#[derive(Debug)]
pub struct ActionReport {
    /// Text currently shown to the user
    pub text: String,
    pub language: Language,
    pub translated: bool,
    pub advisories: Vec<Advisory>,
    pub audio: Option<SynthesizedSpeech>,
    /// What the microphone heard, for voice actions
    pub transcript: Option<String>,
}

/// Content and processing state for one user
#[derive(Debug, Clone)]
pub struct Session {
    original: String,
    /// Original or its summary; translation always starts from here
    english: String,
    /// Text shown and spoken
    processed: String,
    language: Language,
    translated: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            original: String::new(),
            english: String::new(),
            processed: String::new(),
            language: Language::English,
            translated: false,
        }
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn processed(&self) -> &str {
        &self.processed
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub const fn translated(&self) -> bool {
        self.translated
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.original.is_empty()
    }

    fn report(&self, advisories: Vec<Advisory>) -> ActionReport {
        ActionReport {
            text: self.processed.clone(),
            language: self.language,
            translated: self.translated,
            advisories,
            audio: None,
            transcript: None,
        }
    }

    fn no_content(&self) -> ActionReport {
        self.report(vec![Advisory::warning(
            AdvisoryKind::NoContent,
            "No content available for processing. Upload a file, enter a URL, or paste text first.",
        )])
    }

    /// Replace the session content with text acquired from `source`
    pub async fn load(
        &mut self,
        backends: &Backends,
        source: &ContentSource,
        declared_type: Option<&str>,
    ) -> ActionReport {
        let extraction = resolve(backends, source, declared_type).await;

        self.original.clone_from(&extraction.text);
        self.english.clone_from(&extraction.text);
        self.processed = extraction.text;
        self.language = Language::English;
        self.translated = false;

        self.report(extraction.advisories)
    }

    /// Summarize the English text
    ///
    /// Any translation is dropped; translate again to get the summary in
    /// another language.
    pub async fn summarize(&mut self, backends: &Backends) -> ActionReport {
        if !self.has_content() {
            return self.no_content();
        }

        let outcome = maybe_summarize(backends, &self.english).await;
        self.english = outcome.value;
        self.processed.clone_from(&self.english);
        self.language = Language::English;
        self.translated = false;

        self.report(outcome.advisories)
    }

    /// Translate the English text into the language named by `input`
    pub async fn translate(&mut self, backends: &Backends, input: &str) -> ActionReport {
        if !self.has_content() {
            return self.no_content();
        }

        let resolution = resolve_language(input);
        let mut advisories: Vec<Advisory> = resolution.advisory.into_iter().collect();

        let outcome = maybe_translate(backends, &self.english, resolution.language).await;
        let applied = !resolution.language.is_english() && outcome.advisories.is_empty();
        advisories.extend(outcome.advisories);

        self.processed = outcome.value;
        self.language = if applied {
            resolution.language
        } else {
            Language::English
        };
        self.translated = applied;

        self.report(advisories)
    }

    /// Render the current text as speech
    pub async fn speak(&self, backends: &Backends) -> ActionReport {
        if !self.has_content() {
            return self.no_content();
        }

        let outcome = synthesize_speech(backends, &self.processed, self.language).await;
        let mut report = self.report(outcome.advisories);
        report.audio = outcome.value;
        report
    }

    /// Listen for a spoken command and run it
    pub async fn handle_voice(&mut self, backends: &Backends) -> ActionReport {
        let timeout = backends.policy.listen_timeout;

        let transcript = match backends.recognizer.listen(timeout).await {
            Ok(transcript) => transcript,
            Err(e) => {
                tracing::warn!(error = %e, "voice command not captured");
                return self.report(vec![Advisory::from_error(&e)]);
            }
        };
        tracing::info!(transcript = %transcript, "voice command heard");

        let mut report = match VoiceCommand::parse(&transcript) {
            Some(VoiceCommand::Summarize) => self.summarize(backends).await,
            Some(VoiceCommand::ConvertToSpeech) => self.speak(backends).await,
            Some(VoiceCommand::Translate {
                language: Some(language),
            }) => self.translate(backends, &language).await,
            Some(VoiceCommand::Translate { language: None }) => {
                match backends.recognizer.listen(timeout).await {
                    Ok(language) => self.translate(backends, &language).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "translation language not captured");
                        self.report(vec![Advisory::from_error(&e)])
                    }
                }
            }
            None => self.report(vec![Advisory::warning(
                AdvisoryKind::CommandNotRecognized,
                format!(
                    "Command '{transcript}' not recognized. Say 'summarize', 'translate to <language>' or 'convert to speech'."
                ),
            )]),
        };

        report.transcript = Some(transcript);
        report
    }
}
