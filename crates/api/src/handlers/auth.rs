//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use alms_core::error::CoreError;
use alms_core::roles::Role;
use alms_core::storage::{normalize_object_path, BUCKET_AVATARS};
use alms_core::types::DbId;
use alms_db::models::user::{CreateUser, UpdateProfile, User, UserResponse};
use alms_db::repositories::{SessionRepo, UserRepo};
use alms_events::bus::EVENT_USER_REGISTERED;
use alms_events::PlatformEvent;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::RefreshToken;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::handlers::normalize_email;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub full_name: String,
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub phone: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `PUT /auth/me`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub phone: Option<String>,
    /// Object path (or URL) inside the `avatars` bucket.
    pub avatar_path: Option<String>,
}

/// Successful authentication response returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a donor account and sign it in. Returns 201 with tokens.
pub async fn register(
    State(state): State<AppState>,
    Json(mut input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.email = normalize_email(&input.email);
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_email(&state.pool, &input.email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            password_hash,
            full_name: input.full_name.trim().to_string(),
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            role_id: Role::DEFAULT.id(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_USER_REGISTERED)
            .with_source("user", user.id)
            .with_actor(user.id)
            .with_payload(serde_json::json!({
                "email": user.email,
                "full_name": user.full_name,
            })),
    );

    let response = create_auth_response(&state, &user).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // 1. Find user by email.
    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    // 2. Check if the account is active.
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // 3. Check if the account is temporarily locked.
    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    // 4. Verify password.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 5. On failure: increment counter, lock if threshold exceeded.
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        let new_count = user.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    // 6. On success: reset failed count, set last_login_at.
    UserRepo::record_successful_login(&state.pool, user.id).await?;

    // 7. Issue tokens.
    let response = create_auth_response(&state, &user).await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Redeeming revokes the presented token; a replay finds nothing.
    let digest = RefreshToken::digest_of(&input.refresh_token);
    let session = SessionRepo::redeem(&state.pool, &digest)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = create_auth_response(&state, &user).await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, auth_user.user_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user),
    }))
}

/// PUT /api/v1/auth/me
///
/// Update the caller's profile. Only provided fields change.
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let avatar_path = input
        .avatar_path
        .as_deref()
        .map(|p| normalize_object_path(BUCKET_AVATARS, p))
        .transpose()?;

    let update = UpdateProfile {
        full_name: input.full_name.map(|n| n.trim().to_string()),
        phone: input.phone,
        avatar_path,
    };

    let user = UserRepo::update_profile(&state.pool, auth_user.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Issue an access token and a fresh refresh token, opening a session for the latter.
async fn create_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let role = Role::from_id(user.role_id).ok_or_else(|| {
        AppError::InternalError(format!("User {} has unknown role id {}", user.id, user.role_id))
    })?;
    let jwt = &state.config.jwt;

    let access_token = jwt
        .issue_access_token(user.id, role)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = RefreshToken::issue();
    SessionRepo::open(&state.pool, user.id, &refresh.digest, jwt.refresh_expires_at()).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.token,
        expires_in: jwt.access_expires_in(),
        user: UserResponse::from_user(user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            email: "ada@example.com".into(),
            password: "longenough".into(),
            full_name: "Ada".into(),
            phone: None,
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            email: "not-an-email".into(),
            full_name: String::new(),
            ..ok
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("full_name"));
    }
}
