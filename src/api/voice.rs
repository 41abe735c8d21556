//! Voice command endpoint
//!
//! Listens once on the server's default microphone, then runs the command
//! that was heard against the session.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use super::ApiState;
use super::response::ActionResponse;

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/voice", post(voice_command))
        .with_state(state)
}

async fn voice_command(State(state): State<Arc<ApiState>>) -> Json<ActionResponse> {
    let report = state
        .session
        .lock()
        .await
        .handle_voice(&state.backends)
        .await;
    Json(ActionResponse::from_report(report).await)
}
