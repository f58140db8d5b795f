//! Direct (unbatched) writes for sessions and regions.

use chrono::Utc;
use log::debug;

use crate::error_handling::DatabaseError;
use crate::storage::SqliteDriver;
use crate::types::{PocketSession, PortalRegion};

impl SqliteDriver {
    /// Stores a session; a second session with the same key is rejected with
    /// [`DatabaseError::RepeatedSessionKey`].
    pub async fn write_session(&self, session: &PocketSession) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO pocket_session (
                session_key, session_height, portal_region_name, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session.session_key)
        .bind(session.session_height)
        .bind(&session.portal_region_name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!("Session {} already stored", session.session_key);
                Err(DatabaseError::RepeatedSessionKey)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Registers a region. Registering an existing region is a no-op.
    pub async fn write_region(&self, region: &PortalRegion) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO portal_region (portal_region_name) VALUES (?)
             ON CONFLICT (portal_region_name) DO NOTHING",
        )
        .bind(&region.portal_region_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
