//! Session and region handlers. Both write straight to the database.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::super::types::{ApiError, AppState, OkResponse};
use crate::batch::Validate;
use crate::types::{PocketSession, PortalRegion};

pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<PocketSession>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(session) = payload?;
    session.validate()?;
    state.driver.write_session(&session).await?;
    Ok(OkResponse::ok())
}

pub async fn create_region(
    State(state): State<AppState>,
    payload: Result<Json<PortalRegion>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(region) = payload?;
    state.driver.write_region(&region).await?;
    Ok(OkResponse::ok())
}
