//! PDF text extraction

use async_trait::async_trait;
use lopdf::Document;

use super::{DocumentExtractor, parse_blocking};
use crate::{Error, Result};

/// Extracts text from every page of a PDF, in page order
pub struct PdfExtractor;

impl PdfExtractor {
    fn parse(bytes: &[u8]) -> Result<String> {
        let doc = Document::load_mem(bytes).map_err(|e| Error::Parse(format!("invalid PDF: {e}")))?;

        if doc.is_encrypted() {
            return Err(Error::Parse("PDF is encrypted".to_string()));
        }

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return Ok(String::new());
        }

        let text = doc
            .extract_text(&pages)
            .map_err(|e| Error::Parse(format!("failed to read PDF text: {e}")))?;

        tracing::debug!(pages = pages.len(), chars = text.len(), "pdf extracted");
        Ok(text)
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        parse_blocking(bytes, Self::parse).await
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}
