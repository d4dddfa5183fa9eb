//! Repository for the `contact_submissions` table.

use alms_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact::{ContactSubmission, CreateContactSubmission};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, subject, message, is_read, created_at, updated_at";

/// Provides CRUD operations for contact form submissions.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a new submission, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContactSubmission,
    ) -> Result<ContactSubmission, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_submissions (name, email, subject, message)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.subject)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// List submissions newest first. `unread_only` hides handled ones.
    pub async fn list(
        pool: &PgPool,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contact_submissions
             WHERE ($1 = false OR is_read = false)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a submission as read. Returns `true` if the row exists.
    pub async fn mark_read(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE contact_submissions SET is_read = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count unread submissions.
    pub async fn count_unread(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_submissions WHERE is_read = false")
            .fetch_one(pool)
            .await
    }
}
