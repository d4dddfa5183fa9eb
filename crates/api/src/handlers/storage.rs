//! Handler for `/storage/signed-url`.

use alms_core::error::CoreError;
use alms_core::storage::{is_restricted_bucket, normalize_object_path, owner_folder, validate_bucket};
use alms_db::repositories::AidRequestRepo;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /storage/signed-url`.
#[derive(Debug, Deserialize)]
pub struct SignedUrlRequest {
    pub bucket: String,
    /// Bare object path or a stored URL pointing into `bucket`.
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub url: String,
    pub bucket: String,
    pub path: String,
    /// Seconds until the URL stops working.
    pub expires_in: u64,
}

/// POST /api/v1/storage/signed-url
///
/// Issue a time-limited URL for a stored file. Public buckets are open to
/// everyone; `aid-documents` is limited to the uploader, the owner of an aid
/// request referencing the file, and staff.
pub async fn create_signed_url(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(input): Json<SignedUrlRequest>,
) -> AppResult<Json<DataResponse<SignedUrlResponse>>> {
    validate_bucket(&input.bucket)?;
    let path = normalize_object_path(&input.bucket, &input.path)?;

    if is_restricted_bucket(&input.bucket) {
        let user = user.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Sign in to view this document".into(),
            ))
        })?;
        authorize_private(&state, &user, &path).await?;
    }

    let signed = state.signed_urls.get_or_sign(&input.bucket, &path).await?;

    tracing::debug!(bucket = %input.bucket, path = %path, "Signed URL issued");
    Ok(Json(DataResponse {
        data: SignedUrlResponse {
            url: signed.url,
            bucket: input.bucket,
            path,
            expires_in: signed.expires_in.as_secs(),
        },
    }))
}

async fn authorize_private(state: &AppState, user: &AuthUser, path: &str) -> AppResult<()> {
    if user.is_staff() {
        return Ok(());
    }
    if owner_folder(path) == Some(user.user_id.to_string().as_str()) {
        return Ok(());
    }
    if AidRequestRepo::user_owns_document(&state.pool, user.user_id, path).await? {
        return Ok(());
    }

    tracing::warn!(user_id = user.user_id, path, "Denied access to private document");
    Err(AppError::Core(CoreError::Forbidden(
        "You do not have access to this document".into(),
    )))
}
