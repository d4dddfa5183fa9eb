//! Activity log entry model. Entries are append-only (no `updated_at`).

use alms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `activity_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLogEntry {
    pub id: DbId,
    pub event_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for appending an activity log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivityLog {
    pub event_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub details: serde_json::Value,
}
