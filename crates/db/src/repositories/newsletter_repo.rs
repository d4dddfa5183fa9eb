//! Repository for the `newsletter_subscribers` table.

use sqlx::PgPool;

use crate::models::newsletter::NewsletterSubscriber;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, is_active, unsubscribed_at, created_at, updated_at";

/// Provides subscribe/unsubscribe operations.
pub struct NewsletterRepo;

impl NewsletterRepo {
    /// Find a subscriber by email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<NewsletterSubscriber>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM newsletter_subscribers WHERE email = $1");
        sqlx::query_as::<_, NewsletterSubscriber>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Subscribe `email`, re-activating a previous unsubscribe.
    ///
    /// Returns the row and whether the address was newly activated
    /// (`false` when it was already an active subscriber).
    pub async fn subscribe(
        pool: &PgPool,
        email: &str,
    ) -> Result<(NewsletterSubscriber, bool), sqlx::Error> {
        if let Some(existing) = Self::find_by_email(pool, email).await? {
            if existing.is_active {
                return Ok((existing, false));
            }
        }

        let query = format!(
            "INSERT INTO newsletter_subscribers (email) VALUES ($1)
             ON CONFLICT (email) DO UPDATE SET is_active = true, unsubscribed_at = NULL
             RETURNING {COLUMNS}"
        );
        let subscriber = sqlx::query_as::<_, NewsletterSubscriber>(&query)
            .bind(email)
            .fetch_one(pool)
            .await?;
        Ok((subscriber, true))
    }

    /// Deactivate a subscription. Returns `true` if an active row was updated.
    pub async fn unsubscribe(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE newsletter_subscribers SET is_active = false, unsubscribed_at = NOW()
             WHERE email = $1 AND is_active = true",
        )
        .bind(email)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count active subscribers.
    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_subscribers WHERE is_active = true")
            .fetch_one(pool)
            .await
    }
}
