//! Content acquisition
//!
//! Routes a [`ContentSource`] to the right extraction pathway. Every branch
//! contains its own failures: an adapter error becomes empty text plus an
//! advisory, never a propagated error.

use std::path::Path;

use serde::Serialize;

use crate::advisory::{Advisory, AdvisoryKind};
use crate::backends::Backends;
use crate::extract::DocumentFormat;
use crate::web::strip_html_to_text;
use crate::{Error, Result};

/// Where the user's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Uploaded bytes plus the extension of the original file name
    UploadedFile { bytes: Vec<u8>, extension: String },
    RemoteUrl(String),
    RawText(String),
}

impl ContentSource {
    /// Build an upload source, taking the extension from `filename`
    #[must_use]
    pub fn upload(filename: &str, bytes: Vec<u8>) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        Self::UploadedFile { bytes, extension }
    }

    /// Short label for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UploadedFile { .. } => "upload",
            Self::RemoteUrl(_) => "url",
            Self::RawText(_) => "text",
        }
    }
}

/// Text obtained from a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub text: String,
    pub success: bool,
    pub advisories: Vec<Advisory>,
}

impl ExtractionResult {
    fn extracted(text: String) -> Self {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Self {
                text,
                success: true,
                advisories: vec![no_content()],
            };
        }
        Self {
            text,
            success: true,
            advisories: Vec::new(),
        }
    }

    fn failed(err: &Error) -> Self {
        Self {
            text: String::new(),
            success: false,
            advisories: vec![Advisory::from_error(err)],
        }
    }
}

fn no_content() -> Advisory {
    Advisory::warning(
        AdvisoryKind::NoContent,
        "No readable text was found in this content.",
    )
}

/// Acquire text from `source`
///
/// `declared_type` overrides the extension carried by an upload.
pub async fn resolve(
    backends: &Backends,
    source: &ContentSource,
    declared_type: Option<&str>,
) -> ExtractionResult {
    tracing::debug!(source = source.kind(), "resolving content");

    let result = match source {
        ContentSource::RawText(text) => Ok(text.clone()),
        ContentSource::RemoteUrl(url) => fetch_url(backends, url).await,
        ContentSource::UploadedFile { bytes, extension } => {
            extract_upload(backends, bytes, declared_type.unwrap_or(extension)).await
        }
    };

    match result {
        Ok(text) => {
            let result = ExtractionResult::extracted(text);
            tracing::info!(source = source.kind(), chars = result.text.len(), "content acquired");
            result
        }
        Err(e) => {
            tracing::warn!(source = source.kind(), error = %e, "content acquisition failed");
            ExtractionResult::failed(&e)
        }
    }
}

async fn fetch_url(backends: &Backends, url: &str) -> Result<String> {
    if !backends.probe.is_reachable().await {
        return Err(Error::NetworkUnavailable);
    }
    let html = backends.fetcher.fetch(url).await?;
    Ok(strip_html_to_text(&html))
}

async fn extract_upload(backends: &Backends, bytes: &[u8], file_type: &str) -> Result<String> {
    let size = bytes.len() as u64;
    let limit = backends.policy.max_upload_bytes;
    if size > limit {
        return Err(Error::FileTooLarge { size, limit });
    }

    let format = DocumentFormat::from_extension(file_type).ok_or_else(|| {
        Error::UnsupportedFormat(format!(
            "'{file_type}'. Supported types: {}",
            DocumentFormat::EXTENSIONS.join(", ")
        ))
    })?;

    let extractor = backends.extractors.for_format(format);
    tracing::debug!(format = %format, extractor = extractor.name(), bytes = size, "extracting");
    extractor.extract(bytes).await
}
