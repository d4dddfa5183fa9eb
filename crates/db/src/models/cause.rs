//! Cause (fundraising case) model and DTOs.

use alms_core::money::{from_minor_units, progress_percent};
use alms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `causes` table. Amounts are minor units.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cause {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub story: Option<String>,
    pub category: String,
    pub image_path: Option<String>,
    pub beneficiary_name: Option<String>,
    pub goal_minor: i64,
    pub raised_minor: i64,
    pub currency: String,
    pub status: String,
    pub is_urgent: bool,
    pub aid_request_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cause {
    /// Funding goal in major units.
    pub fn goal(&self) -> f64 {
        from_minor_units(self.goal_minor)
    }

    /// Amount raised so far in major units.
    pub fn raised(&self) -> f64 {
        from_minor_units(self.raised_minor)
    }

    /// Share of the goal raised, 0..=100.
    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.raised_minor, self.goal_minor)
    }
}

/// DTO for creating a cause. `slug` is derived from the title by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCause {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub story: Option<String>,
    pub category: String,
    pub image_path: Option<String>,
    pub beneficiary_name: Option<String>,
    pub goal_minor: i64,
    pub currency: String,
    pub is_urgent: bool,
    pub aid_request_id: Option<DbId>,
}

/// DTO for updating a cause. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCause {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub story: Option<String>,
    pub category: Option<String>,
    pub image_path: Option<String>,
    pub beneficiary_name: Option<String>,
    pub goal_minor: Option<i64>,
    pub status: Option<String>,
    pub is_urgent: Option<bool>,
}

/// Filters for the public case listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CauseFilter {
    pub status: Option<String>,
    pub category: Option<String>,
    pub urgent: Option<bool>,
}

/// Number of causes per status for the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CauseStatusCount {
    pub status: String,
    pub count: i64,
}
