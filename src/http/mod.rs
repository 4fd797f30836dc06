//! Axum HTTP surface for the advisor.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api/health
//! POST /api/chat
//! POST /api/recommend
//! POST /api/process-input
//! ```
//!
//! `run()` drives the axum event loop until the [`CancellationToken`] fires,
//! then shuts down gracefully.

mod api;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::advisor::Advisor;
use crate::error::AppError;

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct HttpState {
    pub advisor: Arc<Advisor>,
    /// Upper bound on one pipeline call, LLM round-trips included.
    pub request_timeout: Duration,
}

pub struct HttpServer {
    bind_addr: String,
    state: HttpState,
}

impl HttpServer {
    pub fn new(bind_addr: impl Into<String>, advisor: Arc<Advisor>, request_timeout: Duration) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            state: HttpState { advisor, request_timeout },
        }
    }

    pub async fn run(self, shutdown: CancellationToken) -> Result<(), AppError> {
        let bind_addr = self.bind_addr;
        let router = build_router(self.state);

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| AppError::Http(format!("bind failed on {bind_addr}: {e}")))?;

        info!(%bind_addr, "http server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| AppError::Http(format!("server error: {e}")))?;

        info!("http server shut down");
        Ok(())
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/health",        get(api::health))
        .route("/api/chat",          post(api::chat))
        .route("/api/recommend",     post(api::recommend))
        .route("/api/process-input", post(api::process_input))
        .with_state(state)
}
