//! Relay persistence.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::error_handling::DatabaseError;
use crate::storage::driver::text;
use crate::storage::SqliteDriver;
use crate::types::{ErrorSource, PocketSession, PortalRegion, Relay};

const INSERT_RELAY: &str = "INSERT INTO relay (
    pokt_chain_id, endpoint_id, session_key, protocol_app_public_key,
    relay_source_url, pokt_node_address, pokt_node_domain, pokt_node_public_key,
    relay_start_datetime, relay_return_datetime, is_error, error_code,
    error_name, error_message, error_type, error_source,
    relay_roundtrip_time, relay_chain_method_ids, relay_data_size,
    relay_portal_trip_time, relay_node_trip_time, relay_url_is_public_endpoint,
    portal_region_name, is_altruist_relay, is_user_relay, request_id,
    pokt_tx_id, gigastake_app_id, blocking_plugin, created_at, updated_at
) VALUES (
    ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
    ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
)";

const SELECT_RELAY: &str = "SELECT r.*,
    s.session_height AS session_height,
    s.portal_region_name AS session_region_name,
    s.created_at AS session_created_at,
    s.updated_at AS session_updated_at
FROM relay r
LEFT JOIN pocket_session s ON s.session_key = r.session_key
WHERE r.id = ?";

impl SqliteDriver {
    /// Inserts all relays in one transaction. Either every relay is stored
    /// or none is.
    pub async fn write_relays(&self, relays: &[Relay]) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for relay in relays {
            insert_relay(&mut tx, relay, now).await?;
        }
        tx.commit().await?;
        debug!("Inserted {} relays", relays.len());
        Ok(())
    }

    /// Reads one relay together with the session it belongs to.
    pub async fn read_relay(&self, relay_id: i64) -> Result<Relay, DatabaseError> {
        let row = sqlx::query(SELECT_RELAY)
            .bind(relay_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound {
                entity: "relay",
                id: relay_id,
            })?;
        Ok(relay_from_row(&row)?)
    }
}

async fn insert_relay(
    conn: &mut SqliteConnection,
    relay: &Relay,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(INSERT_RELAY)
        .bind(&relay.pokt_chain_id)
        .bind(&relay.endpoint_id)
        .bind(&relay.session_key)
        .bind(&relay.protocol_app_public_key)
        .bind(text(&relay.relay_source_url))
        .bind(text(&relay.pokt_node_address))
        .bind(text(&relay.pokt_node_domain))
        .bind(text(&relay.pokt_node_public_key))
        .bind(relay.relay_start_datetime)
        .bind(relay.relay_return_datetime)
        .bind(relay.is_error)
        .bind((relay.error_code != 0).then_some(relay.error_code))
        .bind(text(&relay.error_name))
        .bind(text(&relay.error_message))
        .bind(text(&relay.error_type))
        .bind(relay.error_source.map(|source| source.to_string()))
        .bind(relay.relay_roundtrip_time)
        .bind(encode_method_ids(&relay.relay_chain_method_ids)?)
        .bind(relay.relay_data_size)
        .bind(relay.relay_portal_trip_time)
        .bind(relay.relay_node_trip_time)
        .bind(relay.relay_url_is_public_endpoint)
        .bind(&relay.portal_region_name)
        .bind(relay.is_altruist_relay)
        .bind(relay.is_user_relay)
        .bind(&relay.request_id)
        .bind(text(&relay.pokt_tx_id))
        .bind(text(&relay.gigastake_app_id))
        .bind(text(&relay.blocking_plugin))
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

/// Chain method ids are stored as a JSON array in one text column.
fn encode_method_ids(ids: &[String]) -> Result<String, sqlx::Error> {
    serde_json::to_string(ids).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn decode_method_ids(column: &str) -> Result<Vec<String>, sqlx::Error> {
    if column.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(column).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn relay_from_row(row: &SqliteRow) -> Result<Relay, sqlx::Error> {
    let opt_text = |column: &str| -> Result<String, sqlx::Error> {
        Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
    };

    let session_key: String = row.try_get("session_key")?;
    let portal_region_name: String = row.try_get("portal_region_name")?;
    let chain_method_ids: String = row.try_get("relay_chain_method_ids")?;

    Ok(Relay {
        relay_id: row.try_get("id")?,
        pokt_chain_id: row.try_get("pokt_chain_id")?,
        endpoint_id: row.try_get("endpoint_id")?,
        session_key: session_key.clone(),
        protocol_app_public_key: row.try_get("protocol_app_public_key")?,
        relay_source_url: opt_text("relay_source_url")?,
        pokt_node_address: opt_text("pokt_node_address")?,
        pokt_node_domain: opt_text("pokt_node_domain")?,
        pokt_node_public_key: opt_text("pokt_node_public_key")?,
        relay_start_datetime: row.try_get("relay_start_datetime")?,
        relay_return_datetime: row.try_get("relay_return_datetime")?,
        is_error: row.try_get("is_error")?,
        error_code: row.try_get::<Option<i32>, _>("error_code")?.unwrap_or_default(),
        error_name: opt_text("error_name")?,
        error_message: opt_text("error_message")?,
        error_type: opt_text("error_type")?,
        error_source: row
            .try_get::<Option<String>, _>("error_source")?
            .and_then(|source| ErrorSource::from_str(&source).ok()),
        relay_roundtrip_time: row.try_get("relay_roundtrip_time")?,
        relay_chain_method_ids: decode_method_ids(&chain_method_ids)?,
        relay_data_size: row.try_get("relay_data_size")?,
        relay_portal_trip_time: row.try_get("relay_portal_trip_time")?,
        relay_node_trip_time: row.try_get("relay_node_trip_time")?,
        relay_url_is_public_endpoint: row.try_get("relay_url_is_public_endpoint")?,
        portal_region_name: portal_region_name.clone(),
        is_altruist_relay: row.try_get("is_altruist_relay")?,
        is_user_relay: row.try_get("is_user_relay")?,
        request_id: row.try_get("request_id")?,
        pokt_tx_id: opt_text("pokt_tx_id")?,
        gigastake_app_id: opt_text("gigastake_app_id")?,
        session: PocketSession {
            session_key,
            session_height: row
                .try_get::<Option<i32>, _>("session_height")?
                .unwrap_or_default(),
            portal_region_name: opt_text("session_region_name")?,
            created_at: row.try_get("session_created_at")?,
            updated_at: row.try_get("session_updated_at")?,
        },
        region: PortalRegion { portal_region_name },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        blocking_plugin: opt_text("blocking_plugin")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::create_test_driver;
    use crate::types::test_helpers::{valid_relay, valid_session};

    #[tokio::test]
    async fn test_write_and_read_relays() {
        let driver = create_test_driver().await;
        driver.write_session(&valid_session()).await.unwrap();

        let second = Relay {
            request_id: "22".into(),
            is_error: false,
            error_code: 0,
            error_name: String::new(),
            error_message: String::new(),
            error_type: String::new(),
            error_source: None,
            relay_chain_method_ids: Vec::new(),
            ..valid_relay()
        };
        driver
            .write_relays(&[valid_relay(), second.clone()])
            .await
            .unwrap();

        let first = driver.read_relay(1).await.unwrap();
        assert_eq!(first.relay_id, 1);
        assert_eq!(first.pokt_chain_id, "21");
        assert_eq!(first.error_source, Some(ErrorSource::External));
        assert_eq!(
            first.relay_chain_method_ids,
            vec!["eth_call", "eth_getBalance"]
        );
        assert_eq!(
            first.relay_start_datetime,
            valid_relay().relay_start_datetime
        );
        assert!(first.created_at.is_some());
        assert_eq!(first.session.session_height, 21);
        assert_eq!(first.region.portal_region_name, "La Colombia");

        let read_second = driver.read_relay(2).await.unwrap();
        assert_eq!(read_second.request_id, "22");
        assert_eq!(read_second.error_code, 0);
        assert!(read_second.error_source.is_none());
        assert!(read_second.relay_chain_method_ids.is_empty());
    }

    #[tokio::test]
    async fn test_relay_without_session() {
        let driver = create_test_driver().await;
        driver.write_relays(&[valid_relay()]).await.unwrap();

        let relay = driver.read_relay(1).await.unwrap();
        assert_eq!(relay.session.session_key, "21");
        assert_eq!(relay.session.session_height, 0);
        assert!(relay.session.created_at.is_none());
    }

    #[tokio::test]
    async fn test_method_ids_with_commas_survive() {
        let driver = create_test_driver().await;
        let ids = vec!["eth_call,eth_getBalance".to_string(), "net_version".to_string()];
        let relay = Relay {
            relay_chain_method_ids: ids.clone(),
            ..valid_relay()
        };
        driver.write_relays(&[relay]).await.unwrap();

        let stored: String = sqlx::query_scalar("SELECT relay_chain_method_ids FROM relay")
            .fetch_one(driver.pool())
            .await
            .unwrap();
        assert_eq!(stored, r#"["eth_call,eth_getBalance","net_version"]"#);
        assert_eq!(driver.read_relay(1).await.unwrap().relay_chain_method_ids, ids);
    }

    #[tokio::test]
    async fn test_read_missing_relay() {
        let driver = create_test_driver().await;
        let err = driver.read_relay(404).await.unwrap_err();
        assert_eq!(err.to_string(), "relay 404 not found");
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back_batch() {
        let driver = create_test_driver().await;
        // the second row aborts, so the first must not survive either
        sqlx::query(
            "CREATE TRIGGER reject_bad_chain BEFORE INSERT ON relay
             WHEN NEW.pokt_chain_id = 'bad'
             BEGIN SELECT RAISE(ABORT, 'bad chain'); END",
        )
        .execute(driver.pool())
        .await
        .unwrap();

        let bad = Relay {
            pokt_chain_id: "bad".into(),
            ..valid_relay()
        };
        assert!(driver.write_relays(&[valid_relay(), bad]).await.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM relay")
            .fetch_one(driver.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
