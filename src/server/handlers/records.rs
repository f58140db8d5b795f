//! Relay and service record handlers.
//!
//! Writes go through the batches; reads go straight to the database.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use log::warn;

use super::super::types::{ApiError, AppState, OkResponse};
use super::parse_id;
use crate::batch::{Batch, Validate};
use crate::types::{Relay, ServiceRecord};

pub async fn create_relay(
    State(state): State<AppState>,
    payload: Result<Json<Relay>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(relay) = payload?;
    state.relay_batch.add(relay).await?;
    Ok(OkResponse::ok())
}

pub async fn create_relays(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Relay>>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(relays) = payload?;
    let failed = add_all(&state.relay_batch, relays).await;
    if failed > 0 {
        return Err(ApiError::BadRequest(format!(
            "not all relays were processed successfully. failed relays: {failed}"
        )));
    }
    Ok(OkResponse::ok())
}

pub async fn get_relay(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Relay>, ApiError> {
    let relay = state.driver.read_relay(parse_id(&id)?).await?;
    Ok(Json(relay))
}

pub async fn create_service_record(
    State(state): State<AppState>,
    payload: Result<Json<ServiceRecord>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(record) = payload?;
    state.service_record_batch.add(record).await?;
    Ok(OkResponse::ok())
}

pub async fn create_service_records(
    State(state): State<AppState>,
    payload: Result<Json<Vec<ServiceRecord>>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(records) = payload?;
    let failed = add_all(&state.service_record_batch, records).await;
    if failed > 0 {
        return Err(ApiError::BadRequest(format!(
            "not all service records were processed successfully. failed service records: {failed}"
        )));
    }
    Ok(OkResponse::ok())
}

pub async fn get_service_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceRecord>, ApiError> {
    let record = state.driver.read_service_record(parse_id(&id)?).await?;
    Ok(Json(record))
}

/// Adds every item, returning how many were rejected. Valid items are kept
/// even when others in the same request fail.
async fn add_all<T: Validate + Send + 'static>(batch: &Batch<T>, items: Vec<T>) -> usize {
    let mut failed = 0;
    for item in items {
        if let Err(e) = batch.add(item).await {
            warn!("{} batch rejected a record: {}", batch.name(), e);
            failed += 1;
        }
    }
    failed
}
