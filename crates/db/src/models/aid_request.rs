//! Aid request model and DTOs.

use alms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `aid_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AidRequest {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub applicant_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub amount_needed_minor: i64,
    pub currency: String,
    pub document_paths: Vec<String>,
    pub status: String,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting an aid request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAidRequest {
    pub user_id: Option<DbId>,
    pub applicant_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub amount_needed_minor: i64,
    pub currency: String,
    pub document_paths: Vec<String>,
}

/// A staff decision applied to an aid request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewAidRequest {
    /// Status the request must currently be in.
    pub expected_status: String,
    pub new_status: String,
    pub review_notes: Option<String>,
    pub reviewed_by: DbId,
}

/// Number of aid requests per status for the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AidStatusCount {
    pub status: String,
    pub count: i64,
}
