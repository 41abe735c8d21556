//! Summarize, translate and speech endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use super::ApiState;
use super::response::ActionResponse;

/// Build processing router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/summarize", post(summarize))
        .route("/translate", post(translate))
        .route("/speech", post(speech))
        .with_state(state)
}

async fn summarize(State(state): State<Arc<ApiState>>) -> Json<ActionResponse> {
    let report = state.session.lock().await.summarize(&state.backends).await;
    Json(ActionResponse::from_report(report).await)
}

/// Translation request; `language` is a name or code, e.g. "Hindi" or "fr"
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub language: String,
}

async fn translate(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<TranslateRequest>,
) -> Json<ActionResponse> {
    let report = state
        .session
        .lock()
        .await
        .translate(&state.backends, &request.language)
        .await;
    Json(ActionResponse::from_report(report).await)
}

async fn speech(State(state): State<Arc<ApiState>>) -> Json<ActionResponse> {
    let report = state.session.lock().await.speak(&state.backends).await;
    Json(ActionResponse::from_report(report).await)
}
