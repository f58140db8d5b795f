//! Health and Prometheus metrics handlers.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use super::super::types::AppState;
use crate::metrics::render_prometheus;

pub async fn health_handler() -> &'static str {
    "Transaction HTTP DB is up and running!"
}

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        render_prometheus(&state.metrics),
    )
        .into_response()
}
