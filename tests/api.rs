//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use lumen_reader::api::{ApiState, router};
use serde_json::Value;
use tower::ServiceExt;

mod common;
use common::Fakes;

/// Build a test API router over fake backends
fn build_test_router(fakes: &Fakes) -> axum::Router {
    let state = Arc::new(ApiState::new(Arc::new(fakes.backends())));
    router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_upload(filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "lumen-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/content/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let fakes = Fakes::new(true);
    let app = build_test_router(&fakes);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_index_page_served() {
    let fakes = Fakes::new(true);
    let app = build_test_router(&fakes);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Lumen Reader"));
}

#[tokio::test]
async fn test_status_reports_network_state() {
    let fakes = Fakes::new(false);
    let app = build_test_router(&fakes);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["online"], false);
    assert_eq!(json["session"]["has_content"], false);
}

#[tokio::test]
async fn test_text_then_translate() {
    let fakes = Fakes::new(true);
    let app = build_test_router(&fakes);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/content/text",
            &serde_json::json!({"text": "Good morning"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["text"], "Good morning");
    assert_eq!(json["advisories"], serde_json::json!([]));

    let response = app
        .oneshot(post_json(
            "/api/translate",
            &serde_json::json!({"language": "Hindi"}),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["text"], "[hi] Good morning");
    assert_eq!(json["language"], "hi");
    assert_eq!(json["translated"], true);
}

#[tokio::test]
async fn test_summarize_without_content() {
    let fakes = Fakes::new(true);
    let app = build_test_router(&fakes);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/summarize")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["advisories"][0]["kind"], "no_content");
    assert_eq!(json["advisories"][0]["severity"], "warning");
}

#[tokio::test]
async fn test_upload_routes_by_extension() {
    let fakes = Fakes::new(true);
    let app = build_test_router(&fakes);

    let response = app
        .oneshot(multipart_upload("chapter.epub", b"PK\x03\x04"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["text"], "epub text");
    assert_eq!(fakes.epub.count(), 1);
}

#[tokio::test]
async fn test_upload_unsupported_format_is_advisory() {
    let fakes = Fakes::new(true);
    let app = build_test_router(&fakes);

    let response = app
        .oneshot(multipart_upload("archive.rar", b"Rar!"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["advisories"][0]["kind"], "unsupported_format");
    assert_eq!(fakes.extractor_calls(), 0);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let fakes = Fakes::new(true);
    let app = build_test_router(&fakes);

    let boundary = "b";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\npdf\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/content/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_speech_returns_inline_audio() {
    let fakes = Fakes::new(false);
    let app = build_test_router(&fakes);

    app.clone()
        .oneshot(post_json(
            "/api/content/text",
            &serde_json::json!({"text": "Hello world"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/speech")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["audio"]["mime"], "audio/wav");
    assert_eq!(json["audio"]["backend"]["kind"], "offline");
    assert_eq!(json["audio"]["language"], "en");
    assert!(!json["audio"]["data_base64"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_voice_endpoint_reports_transcript() {
    let fakes = Fakes::new(true);
    let app = build_test_router(&fakes);
    fakes.recognizer.say("make me a sandwich");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/voice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["transcript"], "make me a sandwich");
    assert_eq!(json["advisories"][0]["kind"], "command_not_recognized");
}
