//! JWT-based authentication extractors for Axum handlers.

use alms_core::error::CoreError;
use alms_core::roles::Role;
use alms_core::types::DbId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub role: Role,
}

impl AuthUser {
    /// Whether this user is an admin or moderator.
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        decode_bearer(auth_header, state)
    }
}

/// Like [`AuthUser`] but yields `None` for guests.
///
/// A request that does send an `Authorization` header must carry a valid
/// token; a bad token is still rejected with 401.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
        {
            None => Ok(OptionalAuthUser(None)),
            Some(header) => decode_bearer(header, state).map(|user| OptionalAuthUser(Some(user))),
        }
    }
}

fn decode_bearer(header: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })?;

    let claims = state.config.jwt.verify_access_token(token).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    Ok(AuthUser {
        user_id: claims.sub,
        role: claims.role,
    })
}
