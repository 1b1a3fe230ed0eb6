//! Axum HTTP front end for the resolver.
//!
//! ```text
//! GET  /api/health   → {"ok": true}
//! POST /api/explain  → Explanation | {"error": "..."}
//! ```
//!
//! The [`CancellationToken`] passed to [`serve`] is wired to axum's graceful
//! shutdown.

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::resolver::Resolver;

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub(crate) struct ApiState {
    pub resolver: Arc<Resolver>,
}

pub fn build_router(resolver: Arc<Resolver>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/explain", post(api::explain))
        .with_state(ApiState { resolver })
}

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn run(
    bind_addr: &str,
    resolver: Arc<Resolver>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;
    serve(listener, resolver, shutdown).await
}

/// Serve on an already-bound listener (tests bind port 0 themselves).
pub async fn serve(
    listener: TcpListener,
    resolver: Arc<Resolver>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let local_addr = listener.local_addr()?;
    let tier = resolver.tier_name();
    info!(%local_addr, tier, "API listening on http://{local_addr}");

    axum::serve(listener, build_router(resolver))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!("API shut down");
    Ok(())
}
