//! Handlers for `/newsletter`.

use alms_db::repositories::NewsletterRepo;
use alms_events::bus::EVENT_NEWSLETTER_SUBSCRIBED;
use alms_events::PlatformEvent;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::normalize_email;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for subscribe and unsubscribe.
#[derive(Debug, Deserialize, Validate)]
pub struct NewsletterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub email: String,
    pub is_active: bool,
}

/// POST /api/v1/newsletter/subscribe
///
/// Idempotent. Re-subscribing a lapsed address reactivates it; the welcome
/// email only goes out when the address becomes active.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(mut input): Json<NewsletterRequest>,
) -> AppResult<Json<DataResponse<SubscriptionResponse>>> {
    input.email = normalize_email(&input.email);
    input.validate()?;
    let email = input.email;

    let (subscriber, newly_active) = NewsletterRepo::subscribe(&state.pool, &email).await?;

    if newly_active {
        state.event_bus.publish(
            PlatformEvent::new(EVENT_NEWSLETTER_SUBSCRIBED)
                .with_source("newsletter_subscriber", subscriber.id)
                .with_payload(serde_json::json!({ "email": subscriber.email })),
        );
    }

    Ok(Json(DataResponse {
        data: SubscriptionResponse {
            email: subscriber.email,
            is_active: subscriber.is_active,
        },
    }))
}

/// POST /api/v1/newsletter/unsubscribe
///
/// Always 204, whether or not the address was subscribed.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(mut input): Json<NewsletterRequest>,
) -> AppResult<StatusCode> {
    input.email = normalize_email(&input.email);
    input.validate()?;
    let removed = NewsletterRepo::unsubscribe(&state.pool, &input.email).await?;
    tracing::debug!(removed, "Newsletter unsubscribe");
    Ok(StatusCode::NO_CONTENT)
}
