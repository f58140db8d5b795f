//! End-to-end tests for the HTTP front end.
//!
//! Each test starts the full service (in-memory SQLite, both batches, axum
//! router) on an ephemeral port and talks to it with `reqwest`.

mod helpers;

use reqwest::StatusCode;
use serde_json::{json, Value};

use helpers::{relay_json, service_record_json, test_config, wait_until, TestServer};

#[tokio::test]
async fn test_health_needs_no_key() {
    let server = TestServer::start(&test_config(&[])).await;

    let response = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        "Transaction HTTP DB is up and running!"
    );

    server.stop().await;
}

#[tokio::test]
async fn test_missing_or_wrong_key_is_unauthorized() {
    let server = TestServer::start(&test_config(&[])).await;

    let response = server
        .client
        .post(server.url("/v0/relay"))
        .json(&relay_json("1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");

    let response = server
        .client
        .get(server.url("/v0/relay/1"))
        .header("Authorization", "not-a-key")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.state.relay_batch.size(), 0);

    server.stop().await;
}

#[tokio::test]
async fn test_relay_round_trip() {
    let server = TestServer::start(&test_config(&[])).await;

    let response = server
        .post(
            "/v0/session",
            &json!({"sessionKey": "session", "sessionHeight": 7, "portalRegionName": "europe-west3"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.post("/v0/relay", &relay_json("req-1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"result": "ok"}));

    let batch = &server.state.relay_batch;
    wait_until("relay to be buffered", move || async move { batch.size() == 1 }).await;
    assert_eq!(batch.flush().await.unwrap(), 1);

    let response = server.get("/v0/relay/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let relay: Value = response.json().await.unwrap();
    assert_eq!(relay["relayID"], 1);
    assert_eq!(relay["requestID"], "req-1");
    assert_eq!(relay["relayChainMethodID"], json!(["eth_blockNumber"]));
    assert_eq!(relay["session"]["sessionHeight"], 7);
    assert!(relay["createdAt"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn test_invalid_relay_rejected() {
    let server = TestServer::start(&test_config(&[])).await;

    let mut relay = relay_json("req-1");
    relay["poktChainID"] = json!("");
    let response = server.post("/v0/relay", &relay).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "PoktChainID is not set");

    let mut relay = relay_json("req-2");
    relay["relayID"] = json!(3);
    let response = server.post("/v0/relay", &relay).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "RelayID should not be set");

    let state = server.stop().await;
    assert_eq!(
        state
            .metrics
            .get("relay", transaction_http_db::MetricType::Received),
        0
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let server = TestServer::start(&test_config(&[])).await;

    let response = server
        .client
        .post(server.url("/v0/relay"))
        .header("Authorization", helpers::API_KEY)
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn test_bulk_relays_report_failures() {
    let server = TestServer::start(&test_config(&[])).await;

    let mut bad = relay_json("req-bad");
    bad["endpointID"] = json!("");
    let response = server
        .post(
            "/v0/relays",
            &json!([relay_json("req-1"), bad, relay_json("req-2")]),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "not all relays were processed successfully. failed relays: 1"
    );

    // the valid relays were still accepted
    let batch = &server.state.relay_batch;
    wait_until("relays to be buffered", move || async move { batch.size() == 2 }).await;

    let response = server
        .post("/v0/relays", &json!([relay_json("req-3")]))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_service_records() {
    let server = TestServer::start(&test_config(&[])).await;

    let response = server
        .post("/v0/service-record", &service_record_json("node-1"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut bad = service_record_json("node-2");
    bad["tickets"] = json!(0);
    let response = server
        .post(
            "/v0/service-records",
            &json!([service_record_json("node-3"), bad]),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "not all service records were processed successfully. failed service records: 1"
    );

    let batch = &server.state.service_record_batch;
    wait_until("service records to be buffered", move || async move {
        batch.size() == 2
    })
    .await;
    assert_eq!(batch.flush().await.unwrap(), 2);

    let response = server.get("/v0/service-record/2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let record: Value = response.json().await.unwrap();
    assert_eq!(record["serviceRecordID"], 2);
    assert_eq!(record["nodePublicKey"], "node-3");

    server.stop().await;
}

#[tokio::test]
async fn test_lookup_errors() {
    let server = TestServer::start(&test_config(&[])).await;

    let response = server.get("/v0/relay/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server.get("/v0/relay/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "relay 999 not found");

    let response = server.get("/v0/service-record/5").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn test_sessions_and_regions() {
    let server = TestServer::start(&test_config(&[])).await;
    let session = json!({"sessionKey": "abc", "sessionHeight": 1, "portalRegionName": "us-east4"});

    assert_eq!(
        server.post("/v0/session", &session).await.status(),
        StatusCode::OK
    );
    let response = server.post("/v0/session", &session).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "repeated session key");

    let response = server
        .post("/v0/session", &json!({"sessionKey": "def", "sessionHeight": 1}))
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "PortalRegionName is not set");

    let response = server
        .post("/v0/region", &json!({"portalRegionName": "us-east4"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = TestServer::start(&test_config(&[])).await;
    server.post("/v0/relay", &relay_json("req-1")).await;

    let response = reqwest::get(server.url("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = response.text().await.unwrap();
    assert!(text.contains("http_txdb_data{type=\"relay_received\"} 1"));
    assert!(text.contains("http_txdb_data{type=\"service_record_received\"} 0"));

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_saves_accepted_records() {
    let server = TestServer::start(&test_config(&[])).await;
    for i in 0..5 {
        let response = server
            .post("/v0/relay", &relay_json(&format!("req-{i}")))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    server
        .post("/v0/service-record", &service_record_json("node"))
        .await;

    let state = server.stop().await;

    assert_eq!(helpers::count_rows(state.driver.pool(), "relay").await, 5);
    assert_eq!(
        helpers::count_rows(state.driver.pool(), "service_record").await,
        1
    );
    let late: transaction_http_db::Relay = serde_json::from_value(relay_json("late")).unwrap();
    assert!(matches!(
        state.relay_batch.add(late).await,
        Err(transaction_http_db::BatchError::Closed(_))
    ));
}
