//! Repository for the `treatment_updates` table.

use alms_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::{CreateTreatmentUpdate, TreatmentUpdate};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, cause_id, author_id, title, body, image_path, created_at, updated_at";

/// Provides create/list operations for cause progress updates.
pub struct TreatmentUpdateRepo;

impl TreatmentUpdateRepo {
    /// Insert a new update, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTreatmentUpdate,
    ) -> Result<TreatmentUpdate, sqlx::Error> {
        let query = format!(
            "INSERT INTO treatment_updates (cause_id, author_id, title, body, image_path)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TreatmentUpdate>(&query)
            .bind(input.cause_id)
            .bind(input.author_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.image_path)
            .fetch_one(pool)
            .await
    }

    /// List updates for a cause, newest first.
    pub async fn list_for_cause(
        pool: &PgPool,
        cause_id: DbId,
    ) -> Result<Vec<TreatmentUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM treatment_updates
             WHERE cause_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, TreatmentUpdate>(&query)
            .bind(cause_id)
            .fetch_all(pool)
            .await
    }
}
