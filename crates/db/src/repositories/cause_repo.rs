//! Repository for the `causes` table.

use alms_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::cause::{Cause, CauseFilter, CauseStatusCount, CreateCause, UpdateCause};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, slug, summary, story, category, image_path, beneficiary_name, \
                       goal_minor, raised_minor, currency, status, is_urgent, aid_request_id, \
                       created_at, updated_at";

/// Provides CRUD operations for causes.
pub struct CauseRepo;

impl CauseRepo {
    /// Insert a new cause, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCause) -> Result<Cause, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_with(&mut conn, input).await
    }

    /// Insert a cause on an existing connection, e.g. inside a transaction.
    pub async fn create_with(
        conn: &mut PgConnection,
        input: &CreateCause,
    ) -> Result<Cause, sqlx::Error> {
        let query = format!(
            "INSERT INTO causes (title, slug, summary, story, category, image_path,
                                 beneficiary_name, goal_minor, currency, is_urgent, aid_request_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cause>(&query)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.summary)
            .bind(&input.story)
            .bind(&input.category)
            .bind(&input.image_path)
            .bind(&input.beneficiary_name)
            .bind(input.goal_minor)
            .bind(&input.currency)
            .bind(input.is_urgent)
            .bind(input.aid_request_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a cause by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Cause>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM causes WHERE id = $1");
        sqlx::query_as::<_, Cause>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a cause by its URL slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Cause>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM causes WHERE slug = $1");
        sqlx::query_as::<_, Cause>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List causes matching `filter`, urgent first then newest.
    pub async fn list(
        pool: &PgPool,
        filter: &CauseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Cause>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM causes
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR category = $2)
               AND ($3::BOOLEAN IS NULL OR is_urgent = $3)
             ORDER BY is_urgent DESC, created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Cause>(&query)
            .bind(&filter.status)
            .bind(&filter.category)
            .bind(filter.urgent)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a cause. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCause,
    ) -> Result<Option<Cause>, sqlx::Error> {
        let query = format!(
            "UPDATE causes SET
                title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                story = COALESCE($4, story),
                category = COALESCE($5, category),
                image_path = COALESCE($6, image_path),
                beneficiary_name = COALESCE($7, beneficiary_name),
                goal_minor = COALESCE($8, goal_minor),
                status = COALESCE($9, status),
                is_urgent = COALESCE($10, is_urgent)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cause>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.summary)
            .bind(&input.story)
            .bind(&input.category)
            .bind(&input.image_path)
            .bind(&input.beneficiary_name)
            .bind(input.goal_minor)
            .bind(&input.status)
            .bind(input.is_urgent)
            .fetch_optional(pool)
            .await
    }

    /// Delete a cause. Donations keep their rows with `cause_id` cleared.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM causes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count causes per status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<CauseStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, CauseStatusCount>(
            "SELECT status, COUNT(*) AS count FROM causes GROUP BY status ORDER BY status ASC",
        )
        .fetch_all(pool)
        .await
    }
}
