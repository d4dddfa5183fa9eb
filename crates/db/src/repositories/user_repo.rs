//! Repository for the `users` table.

use alms_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateProfile, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, full_name, phone, avatar_path, role_id, \
                       is_active, last_login_at, failed_login_count, locked_until, \
                       created_at, updated_at";

/// Provides CRUD operations for user accounts and profiles.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, full_name, phone, role_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercased.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users, most recently created first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update profile fields. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                avatar_path = COALESCE($4, avatar_path)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(&input.avatar_path)
            .fetch_optional(pool)
            .await
    }

    /// Change a user's role. Returns `None` if the user does not exist.
    pub async fn update_role(
        pool: &PgPool,
        id: DbId,
        role_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET role_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role_id)
            .fetch_optional(pool)
            .await
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Count all registered users.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }
}
