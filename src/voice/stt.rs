//! Speech-to-text (STT) processing

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

const WHISPER_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Response from `OpenAI` Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcribes speech to text with `OpenAI` Whisper
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl SpeechToText {
    /// Create a new STT instance using `OpenAI` Whisper
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new_whisper(api_key: SecretString, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// Transcribe WAV audio to text
    ///
    /// # Errors
    ///
    /// Returns `SpeechServiceUnavailable` if the API cannot be reached or
    /// refuses the request, `SpeechUnrecognized` if no words came back
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::SpeechServiceUnavailable(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let response = self
            .client
            .post(WHISPER_URL)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                Error::SpeechServiceUnavailable(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::SpeechServiceUnavailable(format!(
                "Whisper API error {status}"
            )));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            Error::SpeechServiceUnavailable(e.to_string())
        })?;

        let transcript = result.text.trim().to_string();
        if transcript.is_empty() {
            return Err(Error::SpeechUnrecognized);
        }

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}
