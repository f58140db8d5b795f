//! Shared record fixtures for unit tests.

use chrono::{TimeZone, Utc};

use super::{ErrorSource, PocketSession, Relay, ServiceRecord};

/// Creates a service record that passes validation.
pub(crate) fn valid_service_record() -> ServiceRecord {
    ServiceRecord {
        session_key: "21".into(),
        node_public_key: "21".into(),
        pokt_chain_id: "21".into(),
        request_id: "21".into(),
        portal_region_name: "La Colombia".into(),
        latency: 21.07,
        tickets: 2,
        result: "a".into(),
        available: true,
        successes: 21,
        failures: 7,
        p90_success_latency: 21.07,
        median_success_latency: 21.07,
        weighted_success_latency: 21.07,
        success_rate: 21.0,
        ..Default::default()
    }
}

/// Creates a relay that passes validation.
pub(crate) fn valid_relay() -> Relay {
    Relay {
        pokt_chain_id: "21".into(),
        endpoint_id: "21".into(),
        session_key: "21".into(),
        protocol_app_public_key: "21".into(),
        relay_source_url: "https://relay.example".into(),
        pokt_node_address: "21".into(),
        pokt_node_domain: "node.example".into(),
        pokt_node_public_key: "21".into(),
        relay_start_datetime: Some(Utc.with_ymd_and_hms(2023, 5, 1, 10, 0, 0).unwrap()),
        relay_return_datetime: Some(Utc.with_ymd_and_hms(2023, 5, 1, 10, 0, 1).unwrap()),
        is_error: true,
        error_code: 21,
        error_name: "timeout".into(),
        error_message: "node timed out".into(),
        error_type: "chain".into(),
        error_source: Some(ErrorSource::External),
        relay_roundtrip_time: 1.0,
        relay_chain_method_ids: vec!["eth_call".into(), "eth_getBalance".into()],
        relay_data_size: 21,
        relay_portal_trip_time: 21.0,
        relay_node_trip_time: 21.0,
        portal_region_name: "La Colombia".into(),
        request_id: "21".into(),
        ..Default::default()
    }
}

/// Creates a pocket session that passes validation.
pub(crate) fn valid_session() -> PocketSession {
    PocketSession {
        session_key: "21".into(),
        session_height: 21,
        portal_region_name: "La Colombia".into(),
        ..Default::default()
    }
}
