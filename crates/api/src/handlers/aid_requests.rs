//! Handlers for the `/aid-requests` resource (applicant side).
//!
//! Review endpoints live in [`super::admin`].

use alms_core::aid_request::MAX_DOCUMENTS;
use alms_core::cause::validate_category;
use alms_core::error::CoreError;
use alms_core::money::{to_minor_units, validate_currency};
use alms_core::storage::{normalize_object_path, owner_folder, BUCKET_AID_DOCUMENTS};
use alms_core::types::DbId;
use alms_db::models::aid_request::{AidRequest, CreateAidRequest};
use alms_db::repositories::AidRequestRepo;
use alms_events::bus::EVENT_AID_REQUEST_SUBMITTED;
use alms_events::PlatformEvent;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::normalize_email;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /aid-requests`. `amount_needed` is in major units.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAidRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub applicant_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 20, max = 10000, message = "must be 20-10000 characters"))]
    pub description: String,
    pub category: String,
    pub amount_needed: f64,
    pub currency: Option<String>,
    /// Paths inside the `aid-documents` bucket, under the caller's folder.
    #[serde(default)]
    pub document_paths: Vec<String>,
}

/// POST /api/v1/aid-requests
///
/// Submit an application for assistance. Returns 201 Created.
pub async fn submit_aid_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(mut input): Json<SubmitAidRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AidRequest>>)> {
    input.email = normalize_email(&input.email);
    input.validate()?;
    validate_category(&input.category)?;

    let amount_needed_minor = to_minor_units(input.amount_needed)?;
    let currency = input
        .currency
        .unwrap_or_else(|| state.config.payment.default_currency.clone());
    validate_currency(&currency)?;

    let document_paths = validate_documents(auth_user.user_id, &input.document_paths)?;

    let request = AidRequestRepo::create(
        &state.pool,
        &CreateAidRequest {
            user_id: Some(auth_user.user_id),
            applicant_name: input.applicant_name.trim().to_string(),
            email: input.email,
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            title: input.title.trim().to_string(),
            description: input.description,
            category: input.category,
            amount_needed_minor,
            currency,
            document_paths,
        },
    )
    .await?;

    tracing::info!(
        aid_request_id = request.id,
        documents = request.document_paths.len(),
        "Aid request submitted"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_AID_REQUEST_SUBMITTED)
            .with_source("aid_request", request.id)
            .with_actor(auth_user.user_id)
            .with_payload(serde_json::json!({
                "email": request.email,
                "name": request.applicant_name,
                "title": request.title,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/aid-requests/mine
pub async fn my_aid_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<AidRequest>>>> {
    let requests = AidRequestRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// Normalize document references and check they were uploaded by `user_id`.
fn validate_documents(user_id: DbId, paths: &[String]) -> AppResult<Vec<String>> {
    if paths.len() > MAX_DOCUMENTS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "At most {MAX_DOCUMENTS} documents may be attached"
        ))));
    }

    let owner = user_id.to_string();
    let mut normalized = Vec::with_capacity(paths.len());
    for path in paths {
        let path = normalize_object_path(BUCKET_AID_DOCUMENTS, path)?;
        if owner_folder(&path) != Some(owner.as_str()) {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Document '{path}' was not uploaded by this account"
            ))));
        }
        if !normalized.contains(&path) {
            normalized.push(path);
        }
    }
    Ok(normalized)
}
