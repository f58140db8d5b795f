//! HTTP ingestion server.
//!
//! Provides:
//! - `/` - health check
//! - `/metrics` - Prometheus-compatible batch metrics
//! - `/v0/...` - record ingestion and lookup, guarded by API keys
//!
//! The server stops accepting connections when its shutdown token is
//! cancelled and lets in-flight requests finish.

mod auth;
mod handlers;
mod types;

use std::net::SocketAddr;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use handlers::{
    create_region, create_relay, create_relays, create_service_record, create_service_records,
    create_session, get_relay, get_service_record, health_handler, metrics_handler,
};
pub use types::{ApiError, AppState, OkResponse};

/// Builds the router with every route and the API key layer.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/v0/session", post(create_session))
        .route("/v0/region", post(create_region))
        .route("/v0/relay", post(create_relay))
        .route("/v0/relays", post(create_relays))
        .route("/v0/relay/{id}", get(get_relay))
        .route("/v0/service-record", post(create_service_record))
        .route("/v0/service-records", post(create_service_records))
        .route("/v0/service-record/{id}", get(get_service_record))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(api)
        .with_state(state)
}

/// Binds the listener on all interfaces.
pub async fn bind(port: u16) -> Result<TcpListener, anyhow::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP server to port {}: {}", port, e))
}

/// Serves requests until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Transaction HTTP DB running on http://{}/", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    log::info!("HTTP server stopped accepting requests");
    Ok(())
}
