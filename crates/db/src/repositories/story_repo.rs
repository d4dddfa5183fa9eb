//! Repository for the `success_stories` table.

use alms_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::{CreateSuccessStory, SuccessStory, UpdateSuccessStory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, cause_id, title, body, image_path, is_published, created_at, updated_at";

/// Provides CRUD operations for success stories.
pub struct StoryRepo;

impl StoryRepo {
    /// Insert a new story, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSuccessStory) -> Result<SuccessStory, sqlx::Error> {
        let query = format!(
            "INSERT INTO success_stories (cause_id, title, body, image_path, is_published)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SuccessStory>(&query)
            .bind(input.cause_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.image_path)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    /// List stories newest first. `published_only` hides drafts.
    pub async fn list(pool: &PgPool, published_only: bool) -> Result<Vec<SuccessStory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM success_stories
             WHERE ($1 = false OR is_published = true)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SuccessStory>(&query)
            .bind(published_only)
            .fetch_all(pool)
            .await
    }

    /// Update a story. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSuccessStory,
    ) -> Result<Option<SuccessStory>, sqlx::Error> {
        let query = format!(
            "UPDATE success_stories SET
                title = COALESCE($2, title),
                body = COALESCE($3, body),
                image_path = COALESCE($4, image_path),
                is_published = COALESCE($5, is_published)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SuccessStory>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.image_path)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Delete a story. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM success_stories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
