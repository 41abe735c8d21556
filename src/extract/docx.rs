//! DOCX text extraction
//!
//! A DOCX file is a zip archive; the body lives in `word/document.xml`.
//! Each `w:p` paragraph becomes one line.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;

use super::{DocumentExtractor, parse_blocking};
use crate::{Error, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts paragraph text from Word documents
pub struct DocxExtractor;

impl DocxExtractor {
    fn parse(bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::Parse(format!("invalid DOCX archive: {e}")))?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| Error::Parse(format!("DOCX has no {DOCUMENT_PART}: {e}")))?
            .read_to_string(&mut xml)
            .map_err(|e| Error::Parse(format!("failed to read {DOCUMENT_PART}: {e}")))?;

        let text = paragraphs_from_xml(&xml)?.join("\n");
        tracing::debug!(chars = text.len(), "docx extracted");
        Ok(text)
    }
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        parse_blocking(bytes, Self::parse).await
    }

    fn name(&self) -> &'static str {
        "docx"
    }
}

/// Collect the text of each `w:p` element in document order
pub(super) fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::Parse(format!("bad DOCX text: {e}")))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Parse(format!(
                    "malformed DOCX XML at {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.start_file(DOCUMENT_PART, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf.into_inner()
    }

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First</w:t></w:r><w:r><w:t xml:space="preserve"> paragraph</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>Tom &amp; Jerry</w:t><w:tab/><w:t>tabbed</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_paragraphs_in_order() {
        let paragraphs = paragraphs_from_xml(BODY).unwrap();
        assert_eq!(paragraphs, vec!["First paragraph", "", "Tom & Jerry\ttabbed"]);
    }

    #[tokio::test]
    async fn test_extract_from_archive() {
        let text = DocxExtractor.extract(&build_docx(BODY)).await.unwrap();
        assert_eq!(text, "First paragraph\n\nTom & Jerry\ttabbed");
    }

    #[tokio::test]
    async fn test_missing_document_part() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        let err = DocxExtractor.extract(&buf.into_inner()).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_not_a_zip() {
        let err = DocxExtractor.extract(b"plain bytes").await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
