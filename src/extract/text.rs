//! Plain text passthrough

use async_trait::async_trait;

use super::DocumentExtractor;
use crate::Result;

/// Decodes `.txt` uploads as UTF-8
///
/// Invalid byte sequences are dropped rather than failing the upload.
pub struct TextExtractor;

#[async_trait]
impl DocumentExtractor for TextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let text: String = String::from_utf8_lossy(bytes)
            .chars()
            .filter(|c| *c != char::REPLACEMENT_CHARACTER)
            .collect();
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "text"
    }
}
