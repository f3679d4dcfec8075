//! Axum HTTP surface.
//!
//! ```text
//! POST /generate   {"prompt": "..."} → {"script": "..."}
//! GET  /health     liveness + provider / knowledge-base summary
//! ```
//!
//! Cross-origin requests are allowed from any origin.

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::AppError;
use crate::relay::Relay;

/// Router state injected into every handler via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self { relay: Arc::new(relay) }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate", post(api::generate))
        .route("/health", get(api::health))
        .layer(cors)
        .with_state(state)
}

/// Bind `bind_addr` and serve `router` until `shutdown` is cancelled.
pub async fn serve(bind_addr: &str, router: Router, shutdown: CancellationToken) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    let local = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| bind_addr.to_string());
    info!("relay listening on http://{local}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("relay shut down");
    Ok(())
}
