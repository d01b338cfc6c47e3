//! HTTP server setup with Axum

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::rest::{data, ingest, metrics};
use super::websocket::{handler::ws_handler, AppState};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // REST API endpoints
        .route("/api/ingest", post(ingest::ingest))
        .route("/api/metrics", get(metrics::get_metrics))
        .route("/api/data", get(data::get_data))
        // WebSocket endpoint
        .route("/api/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Serve the router on `addr` until `shutdown` resolves
pub async fn serve<F>(addr: SocketAddr, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
