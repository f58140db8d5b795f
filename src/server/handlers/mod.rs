//! HTTP handlers.

mod metrics;
mod records;
mod session;

pub use metrics::{health_handler, metrics_handler};
pub use records::{
    create_relay, create_relays, create_service_record, create_service_records, get_relay,
    get_service_record,
};
pub use session::{create_region, create_session};

use super::types::ApiError;

/// Parses a numeric path id, rejecting anything else with 400.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid id: {raw}")))
}
