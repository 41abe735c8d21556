//! EPUB text extraction
//!
//! Chapters are read in spine order from the package document referenced by
//! `META-INF/container.xml`. Books without a usable package document fall
//! back to every HTML entry in archive order.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use super::{DocumentExtractor, parse_blocking};
use crate::web::strip_html_to_text;
use crate::{Error, Result};

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Extracts chapter text from EPUB books
pub struct EpubExtractor;

impl EpubExtractor {
    fn parse(bytes: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::Parse(format!("invalid EPUB archive: {e}")))?;

        let chapters = match spine_documents(&mut archive) {
            Ok(chapters) if !chapters.is_empty() => chapters,
            Ok(_) => html_entries(&archive),
            Err(e) => {
                tracing::debug!(error = %e, "no usable package document, reading html entries");
                html_entries(&archive)
            }
        };

        if chapters.is_empty() {
            return Err(Error::Parse("EPUB contains no readable chapters".to_string()));
        }

        let mut text = String::new();
        for path in &chapters {
            let html = read_entry(&mut archive, path)?;
            let chapter = strip_html_to_text(&html);
            if !chapter.is_empty() {
                text.push_str(&chapter);
                text.push('\n');
            }
        }

        tracing::debug!(chapters = chapters.len(), chars = text.len(), "epub extracted");
        Ok(text)
    }
}

#[async_trait]
impl DocumentExtractor for EpubExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        parse_blocking(bytes, Self::parse).await
    }

    fn name(&self) -> &'static str {
        "epub"
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut entry = archive
        .by_name(path)
        .map_err(|e| Error::Parse(format!("EPUB entry {path} missing: {e}")))?;
    let mut buf = Vec::new();
    entry
        .read_to_end(&mut buf)
        .map_err(|e| Error::Parse(format!("failed to read {path}: {e}")))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Resolve chapter paths from the OPF spine
fn spine_documents<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let container = read_entry(archive, CONTAINER_PATH)?;
    let opf_path = rootfile_path(&container)?
        .ok_or_else(|| Error::Parse("container.xml names no rootfile".to_string()))?;

    let opf = read_entry(archive, &opf_path)?;
    let base = opf_path.rfind('/').map_or("", |i| &opf_path[..=i]);

    let (manifest, spine) = parse_package(&opf)?;
    Ok(spine
        .iter()
        .filter_map(|idref| manifest.get(idref))
        .map(|href| resolve_href(base, href))
        .collect())
}

/// Every HTML-like entry, in archive order
fn html_entries<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    archive
        .file_names()
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
        })
        .map(ToString::to_string)
        .collect()
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    let found = e
        .try_get_attribute(key)
        .map_err(|err| Error::Parse(format!("bad XML attribute: {err}")))?;
    found
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .map_err(|err| Error::Parse(format!("bad XML attribute: {err}")))
        })
        .transpose()
}

fn local_name(qname: &[u8]) -> &[u8] {
    qname
        .iter()
        .rposition(|&b| b == b':')
        .map_or(qname, |i| &qname[i + 1..])
}

/// Find `rootfile/@full-path` in container.xml
fn rootfile_path(container: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(container);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                return attr(&e, b"full-path");
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(Error::Parse(format!("malformed container.xml: {e}"))),
        }
    }
}

/// Parse manifest (id → href) and spine (ordered idrefs) from an OPF document
fn parse_package(opf: &str) -> Result<(HashMap<String, String>, Vec<String>)> {
    let mut reader = Reader::from_str(opf);
    let mut manifest = HashMap::new();
    let mut spine = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"item" => {
                    let media_type = attr(&e, b"media-type")?.unwrap_or_default();
                    if media_type.contains("html")
                        && let (Some(id), Some(href)) = (attr(&e, b"id")?, attr(&e, b"href")?)
                    {
                        manifest.insert(id, href);
                    }
                }
                b"itemref" => {
                    if let Some(idref) = attr(&e, b"idref")? {
                        spine.push(idref);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Parse(format!("malformed package document: {e}"))),
        }
    }

    Ok((manifest, spine))
}

/// Join an OPF-relative href onto the OPF directory, dropping fragments
fn resolve_href(base: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let href = urlencoding::decode(href).map_or_else(|_| href.to_string(), |h| h.into_owned());

    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}
