//! Handlers for success stories and testimonials.
//!
//! Public reads return published rows only; the admin handlers see and edit
//! everything.

use alms_core::error::CoreError;
use alms_core::storage::{normalize_object_path, BUCKET_STORY_IMAGES};
use alms_core::types::DbId;
use alms_db::models::content::{
    CreateSuccessStory, CreateTestimonial, SuccessStory, Testimonial, UpdateSuccessStory,
    UpdateTestimonial,
};
use alms_db::repositories::{StoryRepo, TestimonialRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Success stories
// ---------------------------------------------------------------------------

/// GET /api/v1/stories
pub async fn list_stories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SuccessStory>>>> {
    let stories = StoryRepo::list(&state.pool, true).await?;
    Ok(Json(DataResponse { data: stories }))
}

/// GET /api/v1/admin/stories
pub async fn admin_list_stories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<SuccessStory>>>> {
    let stories = StoryRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: stories }))
}

/// POST /api/v1/admin/stories
pub async fn create_story(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(mut input): Json<CreateSuccessStory>,
) -> AppResult<(StatusCode, Json<DataResponse<SuccessStory>>)> {
    require_text("title", &input.title)?;
    require_text("body", &input.body)?;
    input.image_path = story_image(input.image_path.as_deref())?;

    let story = StoryRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: story })))
}

/// PUT /api/v1/admin/stories/{id}
pub async fn update_story(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateSuccessStory>,
) -> AppResult<Json<DataResponse<SuccessStory>>> {
    input.image_path = story_image(input.image_path.as_deref())?;

    let story = StoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SuccessStory",
            id,
        }))?;
    Ok(Json(DataResponse { data: story }))
}

/// DELETE /api/v1/admin/stories/{id}
pub async fn delete_story(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !StoryRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "SuccessStory",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Testimonials
// ---------------------------------------------------------------------------

/// GET /api/v1/testimonials
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Testimonial>>>> {
    let testimonials = TestimonialRepo::list(&state.pool, true).await?;
    Ok(Json(DataResponse { data: testimonials }))
}

/// GET /api/v1/admin/testimonials
pub async fn admin_list_testimonials(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Testimonial>>>> {
    let testimonials = TestimonialRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: testimonials }))
}

/// POST /api/v1/admin/testimonials
pub async fn create_testimonial(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateTestimonial>,
) -> AppResult<(StatusCode, Json<DataResponse<Testimonial>>)> {
    require_text("author_name", &input.author_name)?;
    require_text("quote", &input.quote)?;

    let testimonial = TestimonialRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: testimonial })))
}

/// PUT /api/v1/admin/testimonials/{id}
pub async fn update_testimonial(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTestimonial>,
) -> AppResult<Json<DataResponse<Testimonial>>> {
    let testimonial = TestimonialRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Testimonial",
            id,
        }))?;
    Ok(Json(DataResponse { data: testimonial }))
}

/// DELETE /api/v1/admin/testimonials/{id}
pub async fn delete_testimonial(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TestimonialRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Testimonial",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field}: must not be empty"
        ))));
    }
    Ok(())
}

fn story_image(path: Option<&str>) -> AppResult<Option<String>> {
    path.map(|p| normalize_object_path(BUCKET_STORY_IMAGES, p))
        .transpose()
        .map_err(AppError::from)
}
