//! Content acquisition routing tests

use lumen_reader::{AdvisoryKind, ContentSource, Severity, resolve};

mod common;
use common::{Fakes, PageReply, RecordingExtractor};

#[tokio::test]
async fn test_each_extension_reaches_its_extractor() {
    let cases = [
        ("report.pdf", "pdf text"),
        ("letter.DOCX", "docx text"),
        ("novel.epub", "epub text"),
        ("notes.txt", "plain text"),
        ("scan.jpg", "ocr text"),
        ("scan.jpeg", "ocr text"),
        ("scan.png", "ocr text"),
    ];

    for (name, expected) in cases {
        let fakes = Fakes::new(true);
        let source = ContentSource::upload(name, b"bytes".to_vec());
        let result = resolve(&fakes.backends(), &source, None).await;

        assert!(result.success, "{name}");
        assert_eq!(result.text, expected, "{name}");
        assert!(result.advisories.is_empty(), "{name}");
        assert_eq!(fakes.extractor_calls(), 1, "{name}");
    }
}

#[tokio::test]
async fn test_declared_type_overrides_extension() {
    let fakes = Fakes::new(true);
    let source = ContentSource::upload("download.bin", b"%PDF".to_vec());
    let result = resolve(&fakes.backends(), &source, Some("pdf")).await;

    assert_eq!(result.text, "pdf text");
    assert_eq!(fakes.pdf.count(), 1);
}

#[tokio::test]
async fn test_unsupported_format_never_calls_an_extractor() {
    let fakes = Fakes::new(true);
    let source = ContentSource::upload("slides.pptx", b"bytes".to_vec());
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(!result.success);
    assert!(result.text.is_empty());
    assert_eq!(result.advisories.len(), 1);
    assert_eq!(result.advisories[0].kind, AdvisoryKind::UnsupportedFormat);
    assert!(result.advisories[0].message.contains("pdf, docx, epub"));
    assert_eq!(fakes.extractor_calls(), 0);
}

#[tokio::test]
async fn test_oversized_upload_rejected_before_extraction() {
    let fakes = Fakes::new(true);
    let bytes = vec![0_u8; 60 * 1024 * 1024];
    let source = ContentSource::upload("big.pdf", bytes);
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(!result.success);
    assert_eq!(result.advisories[0].kind, AdvisoryKind::FileTooLarge);
    assert_eq!(result.advisories[0].severity, Severity::Error);
    assert_eq!(fakes.pdf.count(), 0);
}

#[tokio::test]
async fn test_upload_at_limit_is_accepted() {
    let mut fakes = Fakes::new(true);
    fakes.policy.max_upload_bytes = 1024;
    let source = ContentSource::upload("small.txt", vec![b'a'; 1024]);
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(result.success);
    assert_eq!(fakes.text.count(), 1);
}

#[tokio::test]
async fn test_parse_error_becomes_advisory() {
    let mut fakes = Fakes::new(true);
    fakes.docx = std::sync::Arc::new(RecordingExtractor::failing("docx", "corrupt archive"));
    let source = ContentSource::upload("broken.docx", b"PK".to_vec());
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(!result.success);
    assert!(result.text.is_empty());
    assert_eq!(result.advisories[0].kind, AdvisoryKind::ParseError);
    assert!(result.advisories[0].message.contains("corrupt archive"));
}

#[tokio::test]
async fn test_blank_extraction_flags_no_content() {
    let mut fakes = Fakes::new(true);
    fakes.text = std::sync::Arc::new(RecordingExtractor::ok("text", "  \n\t "));
    let source = ContentSource::upload("empty.txt", b"  ".to_vec());
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(result.text.is_empty());
    assert_eq!(result.advisories[0].kind, AdvisoryKind::NoContent);
}

#[tokio::test]
async fn test_url_offline_skips_fetch() {
    let fakes = Fakes::new(false);
    let source = ContentSource::RemoteUrl("https://example.com/article".to_string());
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(!result.success);
    assert_eq!(result.advisories[0].kind, AdvisoryKind::NetworkUnavailable);
    assert_eq!(
        fakes.fetcher.calls.load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_url_online_strips_page_chrome() {
    let fakes = Fakes::new(true);
    let source = ContentSource::RemoteUrl("https://example.com/article".to_string());
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(result.success);
    assert_eq!(result.text, "Article body");
}

#[tokio::test]
async fn test_forbidden_page_gets_dedicated_message() {
    let mut fakes = Fakes::new(true);
    fakes.fetcher = std::sync::Arc::new(common::FakeFetcher::new(PageReply::Status(403)));
    let source = ContentSource::RemoteUrl("https://example.com/paywalled".to_string());
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(!result.success);
    assert_eq!(result.advisories[0].kind, AdvisoryKind::HttpError);
    assert!(result.advisories[0].message.contains("403 Forbidden"));
}

#[tokio::test]
async fn test_raw_text_is_trimmed_and_needs_no_network() {
    let fakes = Fakes::new(false);
    let source = ContentSource::RawText("  Hello world \n".to_string());
    let result = resolve(&fakes.backends(), &source, None).await;

    assert!(result.success);
    assert_eq!(result.text, "Hello world");
    assert!(result.advisories.is_empty());
    assert_eq!(
        fakes.probe.calls.load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_unparsable_pdf_then_pipeline_continues() {
    let fakes = Fakes::new(true);
    let mut backends = fakes.backends();
    backends.extractors.pdf = std::sync::Arc::new(lumen_reader::extract::PdfExtractor);

    let mut session = lumen_reader::Session::new();
    let report = session
        .load(
            &backends,
            &ContentSource::upload("corrupt.pdf", b"%PDF-garbage".to_vec()),
            None,
        )
        .await;
    assert!(report.text.is_empty());
    assert_eq!(report.advisories[0].kind, AdvisoryKind::ParseError);

    let report = session
        .load(&backends, &ContentSource::RawText("Next try".to_string()), None)
        .await;
    assert_eq!(report.text, "Next try");
    assert!(report.advisories.is_empty());
}
