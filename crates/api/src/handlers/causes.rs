//! Handlers for the `/causes` resource.
//!
//! Reads are public. Writes require the `admin` role, except treatment
//! updates which moderators may also post.

use alms_core::cause::{slugify, validate_category, validate_cause_status};
use alms_core::error::CoreError;
use alms_core::money::{to_minor_units, validate_currency};
use alms_core::storage::{normalize_object_path, BUCKET_CAUSE_IMAGES, BUCKET_STORY_IMAGES};
use alms_core::types::DbId;
use alms_db::models::cause::{Cause, CauseFilter, CreateCause, UpdateCause};
use alms_db::models::content::{CreateTreatmentUpdate, TreatmentUpdate};
use alms_db::models::donation::PublicDonation;
use alms_db::repositories::{CauseRepo, DonationRepo, TreatmentUpdateRepo};
use alms_events::bus::{EVENT_CAUSE_CREATED, EVENT_CAUSE_DELETED, EVENT_CAUSE_UPDATED};
use alms_events::PlatformEvent;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /causes`.
#[derive(Debug, Default, Deserialize)]
pub struct CauseListParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub urgent: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /causes`. Amounts are in major units.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCauseRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    /// Derived from the title when omitted.
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub summary: String,
    pub story: Option<String>,
    pub category: String,
    pub image_path: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub beneficiary_name: Option<String>,
    pub goal: f64,
    pub currency: Option<String>,
    #[serde(default)]
    pub is_urgent: bool,
    pub aid_request_id: Option<DbId>,
}

/// Request body for `PUT /causes/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCauseRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub summary: Option<String>,
    pub story: Option<String>,
    pub category: Option<String>,
    pub image_path: Option<String>,
    pub beneficiary_name: Option<String>,
    pub goal: Option<f64>,
    pub status: Option<String>,
    pub is_urgent: Option<bool>,
}

/// Request body for `POST /causes/{id}/updates`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTreatmentUpdateRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub body: String,
    pub image_path: Option<String>,
}

/// A cause with its amounts in major units.
#[derive(Debug, Serialize)]
pub struct CauseResponse {
    #[serde(flatten)]
    pub cause: Cause,
    pub goal: f64,
    pub raised: f64,
    pub progress_percent: f64,
}

impl From<Cause> for CauseResponse {
    fn from(cause: Cause) -> Self {
        Self {
            goal: cause.goal(),
            raised: cause.raised(),
            progress_percent: cause.progress_percent(),
            cause,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/causes
pub async fn list_causes(
    State(state): State<AppState>,
    Query(params): Query<CauseListParams>,
) -> AppResult<Json<DataResponse<Vec<CauseResponse>>>> {
    if let Some(status) = &params.status {
        validate_cause_status(status)?;
    }
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let filter = CauseFilter {
        status: params.status,
        category: params.category,
        urgent: params.urgent,
    };

    let causes = CauseRepo::list(&state.pool, &filter, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse {
        data: causes.into_iter().map(CauseResponse::from).collect(),
    }))
}

/// GET /api/v1/causes/{id}
pub async fn get_cause(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CauseResponse>>> {
    let cause = find_cause(&state, id).await?;
    Ok(Json(DataResponse { data: cause.into() }))
}

/// GET /api/v1/causes/by-slug/{slug}
pub async fn get_cause_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<CauseResponse>>> {
    let cause = CauseRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cause with slug '{slug}' not found")))?;
    Ok(Json(DataResponse { data: cause.into() }))
}

/// POST /api/v1/causes
///
/// Create a cause. Returns 201 Created.
pub async fn create_cause(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateCauseRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CauseResponse>>)> {
    input.validate()?;
    validate_category(&input.category)?;

    let goal_minor = to_minor_units(input.goal)?;
    let currency = input
        .currency
        .unwrap_or_else(|| state.config.payment.default_currency.clone());
    validate_currency(&currency)?;

    let slug = slugify(input.slug.as_deref().unwrap_or(&input.title))?;
    let image_path = input
        .image_path
        .as_deref()
        .map(|p| normalize_object_path(BUCKET_CAUSE_IMAGES, p))
        .transpose()?;

    let cause = CauseRepo::create(
        &state.pool,
        &CreateCause {
            title: input.title.trim().to_string(),
            slug,
            summary: input.summary,
            story: input.story,
            category: input.category,
            image_path,
            beneficiary_name: input.beneficiary_name,
            goal_minor,
            currency,
            is_urgent: input.is_urgent,
            aid_request_id: input.aid_request_id,
        },
    )
    .await?;

    tracing::info!(cause_id = cause.id, slug = %cause.slug, "Cause created");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_CAUSE_CREATED)
            .with_source("cause", cause.id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({ "title": cause.title, "slug": cause.slug })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: cause.into() })))
}

/// PUT /api/v1/causes/{id}
pub async fn update_cause(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCauseRequest>,
) -> AppResult<Json<DataResponse<CauseResponse>>> {
    input.validate()?;
    if let Some(category) = &input.category {
        validate_category(category)?;
    }
    if let Some(status) = &input.status {
        validate_cause_status(status)?;
    }
    let goal_minor = input.goal.map(to_minor_units).transpose()?;
    let image_path = input
        .image_path
        .as_deref()
        .map(|p| normalize_object_path(BUCKET_CAUSE_IMAGES, p))
        .transpose()?;

    let update = UpdateCause {
        title: input.title,
        summary: input.summary,
        story: input.story,
        category: input.category,
        image_path,
        beneficiary_name: input.beneficiary_name,
        goal_minor,
        status: input.status,
        is_urgent: input.is_urgent,
    };

    let cause = CauseRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Cause", id }))?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_CAUSE_UPDATED)
            .with_source("cause", cause.id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({ "title": cause.title, "status": cause.status })),
    );

    Ok(Json(DataResponse { data: cause.into() }))
}

/// DELETE /api/v1/causes/{id}
///
/// Donations keep their rows; their cause link is cleared.
pub async fn delete_cause(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CauseRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Cause", id }));
    }

    tracing::info!(cause_id = id, "Cause deleted");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_CAUSE_DELETED)
            .with_source("cause", id)
            .with_actor(admin.user_id),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/causes/{id}/updates
pub async fn list_treatment_updates(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TreatmentUpdate>>>> {
    find_cause(&state, id).await?;
    let updates = TreatmentUpdateRepo::list_for_cause(&state.pool, id).await?;
    Ok(Json(DataResponse { data: updates }))
}

/// POST /api/v1/causes/{id}/updates
pub async fn create_treatment_update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTreatmentUpdateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TreatmentUpdate>>)> {
    input.validate()?;
    find_cause(&state, id).await?;

    let image_path = input
        .image_path
        .as_deref()
        .map(|p| normalize_object_path(BUCKET_STORY_IMAGES, p))
        .transpose()?;

    let update = TreatmentUpdateRepo::create(
        &state.pool,
        &CreateTreatmentUpdate {
            cause_id: id,
            author_id: Some(staff.user_id),
            title: input.title,
            body: input.body,
            image_path,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: update })))
}

/// GET /api/v1/causes/{id}/donations
///
/// The donor wall: completed donations with anonymous donors masked.
pub async fn list_cause_donations(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PublicDonation>>>> {
    find_cause(&state, id).await?;
    let donations =
        DonationRepo::list_public_for_cause(&state.pool, id, params.limit(), params.offset())
            .await?;
    Ok(Json(DataResponse { data: donations }))
}

async fn find_cause(state: &AppState, id: DbId) -> AppResult<Cause> {
    CauseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Cause", id }))
}
