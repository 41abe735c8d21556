//! HTTP API server for Lumen reader

pub mod content;
pub mod health;
pub mod process;
pub mod response;
pub mod voice;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, response::Html, routing::get};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backends::Backends;
use crate::session::Session;
use crate::Result;

pub use response::{ActionResponse, ApiError, AudioPayload};

/// Embedded single-page front end
const INDEX_HTML: &str = include_str!("index.html");

/// Shared state for API handlers
///
/// The session lock is held for the whole of each action, so actions from
/// concurrent requests run one after another.
pub struct ApiState {
    pub backends: Arc<Backends>,
    pub session: Mutex<Session>,
}

impl ApiState {
    #[must_use]
    pub fn new(backends: Arc<Backends>) -> Self {
        Self {
            backends,
            session: Mutex::new(Session::new()),
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Build the router with all routes
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .nest("/api/content", content::router(state.clone()))
        .nest(
            "/api",
            process::router(state.clone()).merge(voice::router(state.clone())),
        )
        .merge(health::router())
        .merge(health::status_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    addr: SocketAddr,
}

impl ApiServer {
    #[must_use]
    pub fn new(backends: Arc<Backends>, addr: SocketAddr) -> Self {
        Self {
            state: Arc::new(ApiState::new(backends)),
            addr,
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind {}: {e}", self.addr)))?;

        tracing::info!(addr = %self.addr, "API server listening");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
