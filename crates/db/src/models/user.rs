//! User account + profile model and DTOs.

use alms_core::roles::role_name;
use alms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar_path: Option<String>,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar_path: Option<String>,
    /// Role name (e.g. `"admin"`, `"donor"`).
    pub role: &'static str,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            avatar_path: user.avatar_path.clone(),
            role: role_name(user.role_id),
            role_id: user.role_id,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: DbId,
}

/// DTO for a user editing their own profile. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_path: Option<String>,
}
