//! Health and status endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;
use crate::Language;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Service status with a session snapshot
#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub online: bool,
    pub session: SessionSnapshot,
}

#[derive(Serialize)]
pub struct SessionSnapshot {
    pub has_content: bool,
    pub original_chars: usize,
    pub text: String,
    pub language: Language,
    pub translated: bool,
}

/// Current reachability and session state
async fn status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    let online = state.backends.probe.is_reachable().await;
    let session = state.session.lock().await;

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        online,
        session: SessionSnapshot {
            has_content: session.has_content(),
            original_chars: session.original().chars().count(),
            text: session.processed().to_string(),
            language: session.language(),
            translated: session.translated(),
        },
    })
}

/// Build status router
pub fn status_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .with_state(state)
}
