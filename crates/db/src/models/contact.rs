//! Contact form submission model.

use alms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contact_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactSubmission {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}
