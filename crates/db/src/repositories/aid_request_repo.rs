//! Repository for the `aid_requests` table.

use alms_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::aid_request::{AidRequest, AidStatusCount, CreateAidRequest, ReviewAidRequest};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, applicant_name, email, phone, title, description, category, \
                       amount_needed_minor, currency, document_paths, status, review_notes, \
                       reviewed_by, reviewed_at, created_at, updated_at";

/// Provides CRUD and review operations for aid requests.
pub struct AidRequestRepo;

impl AidRequestRepo {
    /// Insert a new aid request in `pending` status.
    pub async fn create(pool: &PgPool, input: &CreateAidRequest) -> Result<AidRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO aid_requests (user_id, applicant_name, email, phone, title, description,
                                       category, amount_needed_minor, currency, document_paths)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AidRequest>(&query)
            .bind(input.user_id)
            .bind(&input.applicant_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.amount_needed_minor)
            .bind(&input.currency)
            .bind(&input.document_paths)
            .fetch_one(pool)
            .await
    }

    /// Find an aid request by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AidRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM aid_requests WHERE id = $1");
        sqlx::query_as::<_, AidRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List aid requests for the review queue, oldest first.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AidRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM aid_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AidRequest>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List the requests a user has submitted, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<AidRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM aid_requests WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, AidRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Whether `user_id` submitted a request that references `path` as a document.
    pub async fn user_owns_document(
        pool: &PgPool,
        user_id: DbId,
        path: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM aid_requests WHERE user_id = $1 AND $2 = ANY(document_paths)
             )",
        )
        .bind(user_id)
        .bind(path)
        .fetch_one(pool)
        .await
    }

    /// Apply a review decision if the request is still in `expected_status`.
    ///
    /// Returns `None` when the row is missing or its status changed
    /// concurrently; the caller re-reads to tell the two apart.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        input: &ReviewAidRequest,
    ) -> Result<Option<AidRequest>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::review_with(&mut conn, id, input).await
    }

    /// [`review`](Self::review) on an existing connection, so a decision can
    /// commit together with the cause it publishes.
    pub async fn review_with(
        conn: &mut PgConnection,
        id: DbId,
        input: &ReviewAidRequest,
    ) -> Result<Option<AidRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE aid_requests SET
                status = $3,
                review_notes = COALESCE($4, review_notes),
                reviewed_by = $5,
                reviewed_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AidRequest>(&query)
            .bind(id)
            .bind(&input.expected_status)
            .bind(&input.new_status)
            .bind(&input.review_notes)
            .bind(input.reviewed_by)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Count aid requests per status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<AidStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, AidStatusCount>(
            "SELECT status, COUNT(*) AS count FROM aid_requests GROUP BY status ORDER BY status ASC",
        )
        .fetch_all(pool)
        .await
    }
}
