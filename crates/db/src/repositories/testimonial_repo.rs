//! Repository for the `testimonials` table.

use alms_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::{CreateTestimonial, Testimonial, UpdateTestimonial};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, author_name, author_role, quote, is_published, created_at, updated_at";

/// Provides CRUD operations for testimonials.
pub struct TestimonialRepo;

impl TestimonialRepo {
    /// Insert a new testimonial, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTestimonial) -> Result<Testimonial, sqlx::Error> {
        let query = format!(
            "INSERT INTO testimonials (author_name, author_role, quote, is_published)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(&input.author_name)
            .bind(&input.author_role)
            .bind(&input.quote)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    /// List testimonials newest first. `published_only` hides drafts.
    pub async fn list(pool: &PgPool, published_only: bool) -> Result<Vec<Testimonial>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM testimonials
             WHERE ($1 = false OR is_published = true)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(published_only)
            .fetch_all(pool)
            .await
    }

    /// Update a testimonial. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTestimonial,
    ) -> Result<Option<Testimonial>, sqlx::Error> {
        let query = format!(
            "UPDATE testimonials SET
                author_name = COALESCE($2, author_name),
                author_role = COALESCE($3, author_role),
                quote = COALESCE($4, quote),
                is_published = COALESCE($5, is_published)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(id)
            .bind(&input.author_name)
            .bind(&input.author_role)
            .bind(&input.quote)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Delete a testimonial. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
