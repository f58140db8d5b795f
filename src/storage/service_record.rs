//! Service record persistence.

use chrono::Utc;
use log::debug;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error_handling::DatabaseError;
use crate::storage::SqliteDriver;
use crate::types::ServiceRecord;

const INSERT_SERVICE_RECORD: &str = "INSERT INTO service_record (
    node_public_key, pokt_chain_id, session_key, request_id, portal_region_name,
    latency, tickets, result, available, successes, failures,
    p90_success_latency, median_success_latency, weighted_success_latency,
    success_rate, created_at, updated_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

impl SqliteDriver {
    /// Inserts all service records in one transaction.
    pub async fn write_service_records(
        &self,
        records: &[ServiceRecord],
    ) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(INSERT_SERVICE_RECORD)
                .bind(&record.node_public_key)
                .bind(&record.pokt_chain_id)
                .bind(&record.session_key)
                .bind(&record.request_id)
                .bind(&record.portal_region_name)
                .bind(record.latency)
                .bind(record.tickets)
                .bind(&record.result)
                .bind(record.available)
                .bind(record.successes)
                .bind(record.failures)
                .bind(record.p90_success_latency)
                .bind(record.median_success_latency)
                .bind(record.weighted_success_latency)
                .bind(record.success_rate)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        debug!("Inserted {} service records", records.len());
        Ok(())
    }

    pub async fn read_service_record(
        &self,
        service_record_id: i64,
    ) -> Result<ServiceRecord, DatabaseError> {
        let row = sqlx::query("SELECT * FROM service_record WHERE id = ?")
            .bind(service_record_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound {
                entity: "service record",
                id: service_record_id,
            })?;
        Ok(service_record_from_row(&row)?)
    }
}

fn service_record_from_row(row: &SqliteRow) -> Result<ServiceRecord, sqlx::Error> {
    Ok(ServiceRecord {
        service_record_id: row.try_get("id")?,
        node_public_key: row.try_get("node_public_key")?,
        pokt_chain_id: row.try_get("pokt_chain_id")?,
        session_key: row.try_get("session_key")?,
        request_id: row.try_get("request_id")?,
        portal_region_name: row.try_get("portal_region_name")?,
        latency: row.try_get("latency")?,
        tickets: row.try_get("tickets")?,
        result: row.try_get("result")?,
        available: row.try_get("available")?,
        successes: row.try_get("successes")?,
        failures: row.try_get("failures")?,
        p90_success_latency: row.try_get("p90_success_latency")?,
        median_success_latency: row.try_get("median_success_latency")?,
        weighted_success_latency: row.try_get("weighted_success_latency")?,
        success_rate: row.try_get("success_rate")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
