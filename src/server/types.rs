//! Shared server state and the JSON response envelope.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::batch::Batch;
use crate::error_handling::{BatchError, DatabaseError, ValidationError};
use crate::metrics::BatchMetrics;
use crate::storage::SqliteDriver;
use crate::types::{Relay, ServiceRecord};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub driver: SqliteDriver,
    pub relay_batch: Arc<Batch<Relay>>,
    pub service_record_batch: Arc<Batch<ServiceRecord>>,
    pub metrics: Arc<BatchMetrics>,
    pub api_keys: Arc<HashSet<String>>,
}

/// Body of every successful write.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub result: &'static str,
}

impl OkResponse {
    pub fn ok() -> Json<Self> {
        Json(OkResponse { result: "ok" })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Handler failure, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unavailable(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.message();
        if status.is_server_error() {
            log::error!("Request failed ({}): {}", status, error);
        } else {
            log::warn!("Request rejected ({}): {}", status, error);
        }
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Validation(e) => e.into(),
            BatchError::Closed(_) => ApiError::Unavailable(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::RepeatedSessionKey => ApiError::BadRequest(err.to_string()),
            DatabaseError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
