//! Content input endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use serde::Deserialize;

use super::ApiState;
use super::response::{ActionResponse, ApiError};
use crate::acquire::ContentSource;

/// Extra room over the upload limit for multipart framing, so oversized
/// files just past the limit still reach the size check
const MULTIPART_SLACK: u64 = 1024 * 1024;

/// Build content router
pub fn router(state: Arc<ApiState>) -> Router {
    let body_limit = state
        .backends
        .policy
        .max_upload_bytes
        .saturating_add(MULTIPART_SLACK);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/url", post(from_url))
        .route("/text", post(from_text))
        .with_state(state)
}

/// Accept a multipart upload with a `file` field and optional `type`
async fn upload(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> Result<Json<ActionResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut declared_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                file = Some((name, bytes.to_vec()));
            }
            Some("type") => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    declared_type = Some(value.trim().to_string());
                }
            }
            _ => {}
        }
    }

    let (name, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("missing 'file' field".to_string()))?;
    tracing::debug!(file = %name, bytes = bytes.len(), "upload received");

    let source = ContentSource::upload(&name, bytes);
    let report = state
        .session
        .lock()
        .await
        .load(&state.backends, &source, declared_type.as_deref())
        .await;

    Ok(Json(ActionResponse::from_report(report).await))
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

async fn from_url(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<UrlRequest>,
) -> Json<ActionResponse> {
    let source = ContentSource::RemoteUrl(request.url);
    let report = state
        .session
        .lock()
        .await
        .load(&state.backends, &source, None)
        .await;

    Json(ActionResponse::from_report(report).await)
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

async fn from_text(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<TextRequest>,
) -> Json<ActionResponse> {
    let source = ContentSource::RawText(request.text);
    let report = state
        .session
        .lock()
        .await
        .load(&state.backends, &source, None)
        .await;

    Json(ActionResponse::from_report(report).await)
}
