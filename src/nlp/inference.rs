//! Hugging Face-compatible inference client

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{SummaryBounds, Summarizer, Translator};
use crate::config::NlpConfig;
use crate::{Error, Language, Result};

#[derive(Serialize)]
struct SummaryRequest<'a> {
    inputs: &'a str,
    parameters: SummaryParameters,
}

#[derive(Serialize)]
struct SummaryParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Serialize)]
struct TranslationRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Deserialize)]
struct TranslationOutput {
    translation_text: String,
}

/// Calls hosted summarization and translation models over HTTP
pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
    summarizer_model: String,
    translation_models: HashMap<Language, String>,
}

impl InferenceClient {
    /// Create a client from the NLP configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &NlpConfig, token: Option<SecretString>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.inference_url.trim_end_matches('/').to_string(),
            token,
            summarizer_model: config.summarizer_model.clone(),
            translation_models: config.translation_models.clone(),
        })
    }

    async fn run<B, T>(&self, model: &str, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + Sync,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/models/{model}", self.base_url);
        tracing::debug!(model, "inference request");

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, model, "inference request failed");
            Error::Model(format!("{model}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, model, "inference API error");
            return Err(Error::Model(format!("{model} returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Model(format!("{model} sent an unexpected response: {e}")))
    }
}

#[async_trait]
impl Summarizer for InferenceClient {
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        let request = SummaryRequest {
            inputs: text,
            parameters: SummaryParameters {
                min_length: bounds.min_length,
                max_length: bounds.max_length,
                do_sample: false,
            },
        };

        let outputs: Vec<SummaryOutput> = self.run(&self.summarizer_model, &request).await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .ok_or_else(|| Error::Model("summarizer returned no output".to_string()))
    }
}

#[async_trait]
impl Translator for InferenceClient {
    fn supports(&self, language: Language) -> bool {
        self.translation_models.contains_key(&language)
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        let model = self
            .translation_models
            .get(&target)
            .ok_or_else(|| Error::Model(format!("no translation model for {target}")))?;

        let outputs: Vec<TranslationOutput> =
            self.run(model, &TranslationRequest { inputs: text }).await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.translation_text)
            .ok_or_else(|| Error::Model(format!("{model} returned no output")))
    }
}
