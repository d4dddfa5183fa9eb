//! Key/value site settings (contact details, bank info, hero text).

use alms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `site_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteSetting {
    pub id: DbId,
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
