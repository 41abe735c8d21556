//! Microphone speech recognition
//!
//! Capture and endpointing run on the blocking pool because the audio stream
//! cannot cross threads. Transcription is a network call to Whisper.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
use super::stt::SpeechToText;
use super::utterance::{DetectorState, UtteranceDetector};
use crate::{Error, Result};

/// How long to sample ambient noise before listening
const CALIBRATION: Duration = Duration::from_secs(1);

/// Poll interval while capturing
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Listens for one spoken phrase and returns its transcript
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Wait up to `timeout` for speech to start, then transcribe the phrase
    ///
    /// # Errors
    ///
    /// Returns `SpeechTimeout`, `SpeechUnrecognized`,
    /// `SpeechServiceUnavailable` or `Audio`
    async fn listen(&self, timeout: Duration) -> Result<String>;
}

/// Recognizer backed by the default input device and Whisper
pub struct MicrophoneRecognizer {
    stt: Option<Arc<SpeechToText>>,
    phrase_limit: Duration,
}

impl MicrophoneRecognizer {
    /// `stt` is `None` when no transcription key is configured
    #[must_use]
    pub const fn new(stt: Option<Arc<SpeechToText>>, phrase_limit: Duration) -> Self {
        Self { stt, phrase_limit }
    }
}

#[async_trait]
impl SpeechRecognizer for MicrophoneRecognizer {
    async fn listen(&self, timeout: Duration) -> Result<String> {
        let stt = self.stt.clone().ok_or_else(|| {
            Error::SpeechServiceUnavailable("no OpenAI API key configured for Whisper".to_string())
        })?;

        let phrase_limit = self.phrase_limit;
        let samples = tokio::task::spawn_blocking(move || record_utterance(timeout, phrase_limit))
            .await
            .map_err(|e| Error::Audio(format!("capture task failed: {e}")))??;

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        stt.transcribe(&wav).await
    }
}

/// Record one utterance from the default microphone
///
/// # Errors
///
/// Returns `SpeechTimeout` if nobody starts speaking within `timeout`
#[allow(clippy::cast_possible_truncation)]
pub fn record_utterance(timeout: Duration, phrase_limit: Duration) -> Result<Vec<f32>> {
    let limit_samples = (phrase_limit.as_millis() as usize) * (SAMPLE_RATE as usize) / 1000;
    let mut detector = UtteranceDetector::new(limit_samples);

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    std::thread::sleep(CALIBRATION);
    detector.calibrate(&capture.take_buffer());
    tracing::info!("listening");

    let started = Instant::now();
    let result = loop {
        std::thread::sleep(POLL_INTERVAL);
        let state = detector.process(&capture.take_buffer());

        match state {
            DetectorState::Complete => break Ok(detector.take_utterance()),
            DetectorState::Waiting if started.elapsed() >= timeout => {
                break Err(Error::SpeechTimeout(timeout.as_secs()));
            }
            // Hard stop in case the phrase never goes quiet
            DetectorState::Speaking if started.elapsed() >= timeout + phrase_limit => {
                break Ok(detector.take_utterance());
            }
            DetectorState::Waiting | DetectorState::Speaking => {}
        }
    };

    capture.stop();
    result
}
