//! Newsletter subscriber model.

use alms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `newsletter_subscribers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NewsletterSubscriber {
    pub id: DbId,
    pub email: String,
    pub is_active: bool,
    pub unsubscribed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
