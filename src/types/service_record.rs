//! Node service record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::Validate;
use crate::error_handling::ValidationError;

use super::validation::{must_be_empty, required};

/// Quality-of-service summary for one node in one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceRecord {
    #[serde(rename = "serviceRecordID")]
    pub service_record_id: i64,
    pub node_public_key: String,
    #[serde(rename = "poktChainID")]
    pub pokt_chain_id: String,
    pub session_key: String,
    #[serde(rename = "requestID")]
    pub request_id: String,
    pub portal_region_name: String,
    pub latency: f64,
    pub tickets: i32,
    pub result: String,
    pub available: bool,
    pub successes: i32,
    pub failures: i32,
    pub p90_success_latency: f64,
    pub median_success_latency: f64,
    pub weighted_success_latency: f64,
    pub success_rate: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validate for ServiceRecord {
    /// Checks fields in declaration order and reports the first problem.
    ///
    /// `latency`, `result`, `successes`, `failures` and `available` are optional.
    fn validate(&self) -> Result<(), ValidationError> {
        must_be_empty("ServiceRecordID", &self.service_record_id)?;
        required("NodePublicKey", &self.node_public_key)?;
        required("PoktChainID", &self.pokt_chain_id)?;
        required("SessionKey", &self.session_key)?;
        required("RequestID", &self.request_id)?;
        required("PortalRegionName", &self.portal_region_name)?;
        required("Tickets", &self.tickets)?;
        required("P90SuccessLatency", &self.p90_success_latency)?;
        required("MedianSuccessLatency", &self.median_success_latency)?;
        required("WeightedSuccessLatency", &self.weighted_success_latency)?;
        required("SuccessRate", &self.success_rate)?;
        must_be_empty("CreatedAt", &self.created_at)?;
        must_be_empty("UpdatedAt", &self.updated_at)?;
        Ok(())
    }
}
