//! Refresh-token session model.

use alms_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `user_sessions` table. One row per issued refresh token.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    /// SHA-256 hex of the refresh token.
    pub token_digest: String,
    pub expires_at: Timestamp,
    /// Set when the token is redeemed or the user logs out.
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
