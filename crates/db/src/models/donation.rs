//! Donation model and DTOs.

use alms_core::money::from_minor_units;
use alms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `donations` table. `amount_minor` is in minor units.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Donation {
    pub id: DbId,
    pub payment_reference: String,
    pub gateway_transaction_id: Option<String>,
    pub cause_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub donor_email: String,
    pub donor_name: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub is_recurring: bool,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub status: String,
    pub paid_at: Option<Timestamp>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Donation {
    /// Donated amount in major units.
    pub fn amount(&self) -> f64 {
        from_minor_units(self.amount_minor)
    }
}

/// DTO for recording a verified donation.
///
/// `cause_id` and `user_id` come from checkout metadata and are only linked
/// when the referenced rows exist.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDonation {
    pub payment_reference: String,
    pub gateway_transaction_id: Option<String>,
    pub cause_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub donor_email: String,
    pub donor_name: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub is_recurring: bool,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub status: String,
    pub paid_at: Option<Timestamp>,
    pub metadata: serde_json::Value,
}

/// Result of an idempotent insert keyed on `payment_reference`.
#[derive(Debug, Clone)]
pub struct RecordedDonation {
    pub donation: Donation,
    /// `false` when a donation with the same reference already existed.
    pub created: bool,
}

/// Donor-wall entry for a cause page; hides the email and, for anonymous
/// gifts, the name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicDonation {
    pub id: DbId,
    pub donor_name: String,
    pub amount_minor: i64,
    pub currency: String,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

/// Completed-donation totals for one currency.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DonationTotals {
    pub currency: String,
    pub total_minor: i64,
    pub donation_count: i64,
    pub donor_count: i64,
    pub recurring_count: i64,
}
