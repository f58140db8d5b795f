//! Relay log record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::batch::Validate;
use crate::error_handling::ValidationError;

use super::validation::{must_be_empty, required};
use super::{PocketSession, PortalRegion};

/// Which side of the portal produced a relay error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorSource {
    Internal,
    External,
}

/// One relay served through the portal.
///
/// `session` and `region` are only populated when a relay is read back from
/// storage; they are ignored on ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Relay {
    #[serde(rename = "relayID")]
    pub relay_id: i64,
    #[serde(rename = "poktChainID")]
    pub pokt_chain_id: String,
    #[serde(rename = "endpointID")]
    pub endpoint_id: String,
    pub session_key: String,
    pub protocol_app_public_key: String,
    pub relay_source_url: String,
    pub pokt_node_address: String,
    pub pokt_node_domain: String,
    pub pokt_node_public_key: String,
    pub relay_start_datetime: Option<DateTime<Utc>>,
    pub relay_return_datetime: Option<DateTime<Utc>>,
    pub is_error: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub error_code: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_source: Option<ErrorSource>,
    pub relay_roundtrip_time: f64,
    #[serde(rename = "relayChainMethodID")]
    pub relay_chain_method_ids: Vec<String>,
    pub relay_data_size: i32,
    pub relay_portal_trip_time: f64,
    pub relay_node_trip_time: f64,
    pub relay_url_is_public_endpoint: bool,
    pub portal_region_name: String,
    pub is_altruist_relay: bool,
    pub is_user_relay: bool,
    #[serde(rename = "requestID")]
    pub request_id: String,
    #[serde(rename = "poktTxID")]
    pub pokt_tx_id: String,
    #[serde(rename = "gigastakeAppID")]
    pub gigastake_app_id: String,
    pub session: PocketSession,
    pub region: PortalRegion,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub blocking_plugin: String,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

impl Validate for Relay {
    /// Requires the columns the relay table cannot store empty; every
    /// measurement field is optional.
    fn validate(&self) -> Result<(), ValidationError> {
        must_be_empty("RelayID", &self.relay_id)?;
        required("PoktChainID", &self.pokt_chain_id)?;
        required("EndpointID", &self.endpoint_id)?;
        required("SessionKey", &self.session_key)?;
        required("ProtocolAppPublicKey", &self.protocol_app_public_key)?;
        required("PortalRegionName", &self.portal_region_name)?;
        required("RequestID", &self.request_id)?;
        must_be_empty("CreatedAt", &self.created_at)?;
        must_be_empty("UpdatedAt", &self.updated_at)?;
        Ok(())
    }
}
