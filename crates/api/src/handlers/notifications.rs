//! Handler for `/notifications/email`: staff-triggered transactional email.

use std::str::FromStr;

use alms_core::error::CoreError;
use alms_events::bus::EVENT_EMAIL_SENT;
use alms_events::templates::render;
use alms_events::{EmailKind, OutgoingEmail, PlatformEvent};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /notifications/email`.
#[derive(Debug, Deserialize, Validate)]
pub struct SendEmailRequest {
    /// Template tag, e.g. `donation_receipt`.
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(email(message = "must be a valid email address"))]
    pub to: String,
    /// Template variables.
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub kind: EmailKind,
    pub to: String,
    pub subject: String,
}

/// POST /api/v1/notifications/email
///
/// Render one of the fixed templates and send it immediately.
pub async fn send_email(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(mut input): Json<SendEmailRequest>,
) -> AppResult<Json<DataResponse<SendEmailResponse>>> {
    input.to = input.to.trim().to_string();
    input.validate()?;
    let kind = EmailKind::from_str(&input.kind)
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let rendered = render(kind, &input.data, &state.config.site_url);
    let email = OutgoingEmail::new(input.to.as_str(), rendered);
    state.mailer.send(&email).await?;

    tracing::info!(email_kind = %kind, "Notification email sent");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_EMAIL_SENT)
            .with_actor(staff.user_id)
            .with_payload(serde_json::json!({
                "kind": kind.as_str(),
                "to": email.to,
            })),
    );

    Ok(Json(DataResponse {
        data: SendEmailResponse {
            kind,
            to: email.to,
            subject: email.subject,
        },
    }))
}
