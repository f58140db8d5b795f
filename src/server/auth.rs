//! API key check applied to every `/v0` route.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::types::{ApiError, AppState};

/// Rejects requests whose `Authorization` header is not a configured key.
pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| state.api_keys.contains(key));

    if !authorized {
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}
