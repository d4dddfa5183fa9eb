//! Repository for the append-only `activity_log` table.

use sqlx::PgPool;

use crate::models::activity::{ActivityLogEntry, CreateActivityLog};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, event_type, entity_type, entity_id, actor_user_id, details, created_at";

/// Provides append and query operations for the activity log.
pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Append an entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateActivityLog,
    ) -> Result<ActivityLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_log (event_type, entity_type, entity_id, actor_user_id, details)
             VALUES ($1, $2, $3, (SELECT id FROM users WHERE id = $4), $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLogEntry>(&query)
            .bind(&input.event_type)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(input.actor_user_id)
            .bind(&input.details)
            .fetch_one(pool)
            .await
    }

    /// List entries newest first, optionally filtered by event type.
    pub async fn list(
        pool: &PgPool,
        event_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_log
             WHERE ($1::TEXT IS NULL OR event_type = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ActivityLogEntry>(&query)
            .bind(event_type)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count entries, optionally filtered by event type.
    pub async fn count(pool: &PgPool, event_type: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_log WHERE ($1::TEXT IS NULL OR event_type = $1)",
        )
        .bind(event_type)
        .fetch_one(pool)
        .await
    }
}
