//! Online text-to-speech

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::artifact::{AudioArtifact, AudioFormat};
use crate::{Error, Language, Result};

const GOOGLE_TTS_URL: &str = "https://translate.google.com/translate_tts";

const OPENAI_TTS_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Longest text the Google endpoint accepts per request
pub const GOOGLE_CHUNK_CHARS: usize = 200;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Renders text with a network speech service
#[async_trait]
pub trait OnlineSynthesizer: Send + Sync {
    /// # Errors
    ///
    /// Returns `Synthesis` if the service fails or is unreachable
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioArtifact>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Google Translate's speech endpoint
///
/// Needs no key and speaks every supported language. Text is sent in chunks
/// and the MP3 responses are concatenated.
pub struct GoogleTts {
    client: reqwest::Client,
}

impl GoogleTts {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: Language,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client
            .get(GOOGLE_TTS_URL)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language.code()),
                ("q", chunk),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("Google TTS request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Synthesis(format!("Google TTS error {status}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(format!("Google TTS read failed: {e}")))?;
        Ok(audio.to_vec())
    }
}

#[async_trait]
impl OnlineSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioArtifact> {
        let chunks = chunk_text(text, GOOGLE_CHUNK_CHARS);
        tracing::debug!(chunks = chunks.len(), language = language.code(), "google tts");

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, language, idx, chunks.len()).await?);
        }

        if audio.is_empty() {
            return Err(Error::Synthesis("Google TTS returned no audio".to_string()));
        }
        AudioArtifact::from_bytes(&audio, AudioFormat::Mp3)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// `OpenAI` speech API
pub struct OpenAiTts {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    voice: String,
}

impl OpenAiTts {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(api_key: SecretString, model: String, voice: String) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            voice,
        })
    }
}

#[async_trait]
impl OnlineSynthesizer for OpenAiTts {
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioArtifact> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: "mp3",
        };

        tracing::debug!(model = %self.model, language = language.code(), "openai tts");

        let response = self
            .client
            .post(OPENAI_TTS_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("OpenAI TTS request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(format!("OpenAI TTS read failed: {e}")))?;
        AudioArtifact::from_bytes(&audio, AudioFormat::Mp3)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Split text into chunks of at most `max_chars` characters
///
/// Breaks fall on whitespace; words longer than the limit are split.
#[must_use]
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
