//! Handler for the public contact form.

use alms_db::models::contact::{ContactSubmission, CreateContactSubmission};
use alms_db::repositories::ContactRepo;
use alms_events::bus::EVENT_CONTACT_SUBMITTED;
use alms_events::PlatformEvent;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::normalize_email;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /contact`.
#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub message: String,
}

/// POST /api/v1/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(mut input): Json<ContactRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ContactSubmission>>)> {
    input.email = normalize_email(&input.email);
    input.validate()?;

    let submission = ContactRepo::create(
        &state.pool,
        &CreateContactSubmission {
            name: input.name.trim().to_string(),
            email: input.email,
            subject: input.subject.filter(|s| !s.trim().is_empty()),
            message: input.message,
        },
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_CONTACT_SUBMITTED)
            .with_source("contact_submission", submission.id)
            .with_payload(serde_json::json!({
                "email": submission.email,
                "name": submission.name,
                "subject": submission.subject,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: submission })))
}
