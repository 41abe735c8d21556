//! Text extraction from uploaded documents
//!
//! One adapter per supported format, each delegating to a single parsing
//! library or engine. Routing is a closed match over [`DocumentFormat`].

mod docx;
mod epub;
mod ocr;
mod pdf;
mod text;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub use docx::DocxExtractor;
pub use epub::EpubExtractor;
pub use ocr::OcrExtractor;
pub use pdf::PdfExtractor;
pub use text::TextExtractor;

use crate::config::OcrConfig;
use crate::{Error, Result};

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Epub,
    Text,
    Image,
}

impl DocumentFormat {
    /// Every supported format
    pub const ALL: [Self; 5] = [Self::Pdf, Self::Docx, Self::Epub, Self::Text, Self::Image];

    /// Accepted file extensions, lowercase and without the dot
    pub const EXTENSIONS: [&'static str; 7] = ["pdf", "docx", "epub", "txt", "jpg", "jpeg", "png"];

    /// Map a file extension to a format
    ///
    /// Matching ignores case, surrounding whitespace and a leading dot.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim();
        let ext = ext.strip_prefix('.').unwrap_or(ext).to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "epub" => Some(Self::Epub),
            "txt" => Some(Self::Text),
            "jpg" | "jpeg" | "png" => Some(Self::Image),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Epub => "EPUB",
            Self::Text => "TXT",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Extracts plain text from the bytes of one document format
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract the document's text
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed documents, OCR errors for images
    async fn extract(&self, bytes: &[u8]) -> Result<String>;

    /// Extractor name for logging
    fn name(&self) -> &'static str;
}

/// One extractor per [`DocumentFormat`]
#[derive(Clone)]
pub struct Extractors {
    pub pdf: Arc<dyn DocumentExtractor>,
    pub docx: Arc<dyn DocumentExtractor>,
    pub epub: Arc<dyn DocumentExtractor>,
    pub text: Arc<dyn DocumentExtractor>,
    pub image: Arc<dyn DocumentExtractor>,
}

impl Extractors {
    /// Standard library and engine-backed extractors
    #[must_use]
    pub fn standard(ocr: &OcrConfig) -> Self {
        Self {
            pdf: Arc::new(PdfExtractor),
            docx: Arc::new(DocxExtractor),
            epub: Arc::new(EpubExtractor),
            text: Arc::new(TextExtractor),
            image: Arc::new(OcrExtractor::new(&ocr.tesseract_cmd, &ocr.language)),
        }
    }

    /// The extractor responsible for a format
    #[must_use]
    pub fn for_format(&self, format: DocumentFormat) -> &dyn DocumentExtractor {
        match format {
            DocumentFormat::Pdf => self.pdf.as_ref(),
            DocumentFormat::Docx => self.docx.as_ref(),
            DocumentFormat::Epub => self.epub.as_ref(),
            DocumentFormat::Text => self.text.as_ref(),
            DocumentFormat::Image => self.image.as_ref(),
        }
    }
}

/// Run a CPU-bound parser on the blocking pool
async fn parse_blocking<F>(bytes: &[u8], parse: F) -> Result<String>
where
    F: FnOnce(&[u8]) -> Result<String> + Send + 'static,
{
    let owned = bytes.to_vec();
    tokio::task::spawn_blocking(move || parse(&owned))
        .await
        .map_err(|e| Error::Parse(format!("extraction task failed: {e}")))?
}
