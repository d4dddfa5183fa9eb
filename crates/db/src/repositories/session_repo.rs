//! Repository for the `user_sessions` table.
//!
//! Refresh tokens are single-use: redeeming one revokes its session in the
//! same statement that reads it, so two concurrent refreshes with the same
//! token cannot both succeed.

use alms_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::UserSession;

const COLUMNS: &str = "id, user_id, token_digest, expires_at, revoked_at, created_at";

pub struct SessionRepo;

impl SessionRepo {
    /// Record a newly issued refresh token.
    pub async fn open(
        pool: &PgPool,
        user_id: DbId,
        token_digest: &str,
        expires_at: Timestamp,
    ) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, token_digest, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(user_id)
            .bind(token_digest)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Revoke the live session behind `token_digest` and return it.
    ///
    /// `None` if the token is unknown, expired, or already redeemed.
    pub async fn redeem(
        pool: &PgPool,
        token_digest: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET revoked_at = NOW()
             WHERE token_digest = $1
               AND revoked_at IS NULL
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(token_digest)
            .fetch_optional(pool)
            .await
    }

    /// Revoke every live session of a user. Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
