//! Pocket sessions and portal regions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::Validate;
use crate::error_handling::ValidationError;

use super::validation::{must_be_empty, required};

/// A Pocket Network session, identified by its session key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PocketSession {
    pub session_key: String,
    pub session_height: i32,
    pub portal_region_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validate for PocketSession {
    fn validate(&self) -> Result<(), ValidationError> {
        required("SessionKey", &self.session_key)?;
        required("SessionHeight", &self.session_height)?;
        required("PortalRegionName", &self.portal_region_name)?;
        must_be_empty("CreatedAt", &self.created_at)?;
        must_be_empty("UpdatedAt", &self.updated_at)?;
        Ok(())
    }
}

/// Region a portal instance runs in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalRegion {
    pub portal_region_name: String,
}
