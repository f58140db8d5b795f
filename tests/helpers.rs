// Shared test helpers for database setup, server startup and test data.
//
// Each integration test file pulls this in with `mod helpers;`.

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use clap::Parser;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use transaction_http_db::server::AppState;
use transaction_http_db::{build_state, init_db_pool, run_migrations, run_until, Config};

pub const API_KEY: &str = "test-key";

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
pub async fn create_test_pool() -> SqlitePool {
    let pool = init_db_pool("sqlite::memory:", 1)
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Parses a config for an in-memory database, with `extra` flags appended.
pub fn test_config(extra: &[&str]) -> Config {
    let mut args = vec![
        "transaction_http_db",
        "--connection-string",
        "sqlite::memory:",
        "--api-keys",
        API_KEY,
        "--db-max-connections",
        "1",
        "--max-relay-batch-duration",
        "3600",
        "--max-service-record-batch-duration",
        "3600",
    ];
    args.extend_from_slice(extra);
    Config::try_parse_from(args).expect("test config should parse")
}

/// A server running on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    pub async fn start(config: &Config) -> Self {
        let state = build_state(config).await.expect("state should build");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(run_until(listener, state.clone(), async move {
            let _ = stopped.await;
        }));

        TestServer {
            base_url: format!("http://{}", addr),
            state,
            client: reqwest::Client::new(),
            stop: Some(stop),
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("Authorization", API_KEY)
            .json(body)
            .send()
            .await
            .expect("request should complete")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("Authorization", API_KEY)
            .send()
            .await
            .expect("request should complete")
    }

    /// Triggers the graceful shutdown and waits for it to finish.
    pub async fn stop(mut self) -> AppState {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task
            .await
            .expect("server task should not panic")
            .expect("server should shut down cleanly");
        self.state
    }
}

/// Polls `check` every few milliseconds until it returns true, panicking after 5s.
pub async fn wait_until<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check().await {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count query")
}

pub fn relay_json(request_id: &str) -> Value {
    json!({
        "poktChainID": "0021",
        "endpointID": "endpoint",
        "sessionKey": "session",
        "protocolAppPublicKey": "app-key",
        "relaySourceUrl": "https://relay.example",
        "poktNodeAddress": "node-address",
        "relayStartDatetime": "2023-05-01T10:00:00Z",
        "relayReturnDatetime": "2023-05-01T10:00:01Z",
        "isError": false,
        "relayRoundtripTime": 1.5,
        "relayChainMethodID": ["eth_blockNumber"],
        "relayDataSize": 64,
        "portalRegionName": "europe-west3",
        "requestID": request_id
    })
}

pub fn service_record_json(node: &str) -> Value {
    json!({
        "nodePublicKey": node,
        "poktChainID": "0021",
        "sessionKey": "session",
        "requestID": "request",
        "portalRegionName": "europe-west3",
        "latency": 21.07,
        "tickets": 2,
        "result": "a",
        "available": true,
        "successes": 21,
        "failures": 7,
        "p90SuccessLatency": 21.07,
        "medianSuccessLatency": 21.07,
        "weightedSuccessLatency": 21.07,
        "successRate": 21.0
    })
}
