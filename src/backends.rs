//! Backend wiring
//!
//! Every external collaborator sits behind a trait object. [`Backends`] is
//! built once at startup and passed by reference into the pipeline; tests
//! swap in fakes.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, TtsProviderKind};
use crate::extract::Extractors;
use crate::network::{NetworkProbe, TcpProbe};
use crate::nlp::{InferenceClient, SummaryBounds, Summarizer, Translator};
use crate::voice::{
    EspeakSynthesizer, GoogleTts, MicrophoneRecognizer, OfflineSynthesizer, OnlineSynthesizer,
    OpenAiTts, SpeechRecognizer, SpeechToText,
};
use crate::web::{HttpPageFetcher, PageFetcher};
use crate::{Error, Result};

/// Fallback and limit settings consulted by the pipeline
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub max_upload_bytes: u64,
    pub degrade_offline_to_english: bool,
    pub translation_max_tokens: usize,
    pub summary_min_words: usize,
    pub summary_bounds: SummaryBounds,
    pub listen_timeout: Duration,
}

impl Policy {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_upload_bytes: config.limits.max_upload_bytes,
            degrade_offline_to_english: config.voice.degrade_to_english,
            translation_max_tokens: config.nlp.translation_max_tokens,
            summary_min_words: config.nlp.summary_min_words,
            summary_bounds: config.nlp.summary_bounds,
            listen_timeout: config.voice.listen_timeout,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The set of adapters one pipeline run may call
#[derive(Clone)]
pub struct Backends {
    pub probe: Arc<dyn NetworkProbe>,
    pub extractors: Extractors,
    pub fetcher: Arc<dyn PageFetcher>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub online_tts: Arc<dyn OnlineSynthesizer>,
    pub offline_tts: Arc<dyn OfflineSynthesizer>,
    pub translator: Arc<dyn Translator>,
    pub summarizer: Arc<dyn Summarizer>,
    pub policy: Policy,
}

impl Backends {
    /// Build the standard adapters from configuration
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built or the chosen TTS
    /// provider lacks its key
    pub fn from_config(config: &Config) -> Result<Self> {
        let probe = Arc::new(TcpProbe::new(
            config.network.probe_addr.clone(),
            config.network.probe_timeout,
        ));

        let fetcher = Arc::new(HttpPageFetcher::new(
            config.network.fetch_timeout,
            &config.network.user_agent,
        )?);

        let stt = match &config.api_keys.openai {
            Some(key) => Some(Arc::new(SpeechToText::new_whisper(
                key.clone(),
                config.voice.stt_model.clone(),
            )?)),
            None => {
                tracing::warn!("no OpenAI API key, voice commands are unavailable");
                None
            }
        };
        let recognizer = Arc::new(MicrophoneRecognizer::new(stt, config.voice.phrase_limit));

        let online_tts: Arc<dyn OnlineSynthesizer> = match config.voice.tts_provider {
            TtsProviderKind::Google => Arc::new(GoogleTts::new(&config.network.user_agent)?),
            TtsProviderKind::OpenAI => {
                let key = config.api_keys.openai.clone().ok_or_else(|| {
                    Error::Config("OpenAI API key required for the openai TTS provider".to_string())
                })?;
                Arc::new(OpenAiTts::new(
                    key,
                    config.voice.tts_model.clone(),
                    config.voice.tts_voice.clone(),
                )?)
            }
        };

        let offline_tts = Arc::new(EspeakSynthesizer::new(
            &config.voice.offline_engine,
            config.voice.offline_rate_wpm,
        ));

        let inference = Arc::new(InferenceClient::new(
            &config.nlp,
            config.api_keys.huggingface.clone(),
        )?);

        tracing::debug!(
            tts = online_tts.name(),
            offline = offline_tts.name(),
            "backends initialized"
        );

        Ok(Self {
            probe,
            extractors: Extractors::standard(&config.ocr),
            fetcher,
            recognizer,
            online_tts,
            offline_tts,
            translator: inference.clone(),
            summarizer: inference,
            policy: Policy::from_config(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_backends_build_without_keys() {
        let backends = Backends::from_config(&Config::default()).unwrap();
        assert_eq!(backends.online_tts.name(), "google");
        assert_eq!(backends.policy.max_upload_bytes, 50 * 1024 * 1024);
        assert!(backends.policy.degrade_offline_to_english);
    }
}
