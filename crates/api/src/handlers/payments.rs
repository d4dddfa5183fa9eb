//! Handlers for the `/payments` resource: checkout initialization, redirect
//! verification and the gateway webhook.

use alms_core::cause::accepts_donations;
use alms_core::donation::{generate_reference, DonationMetadata};
use alms_core::error::CoreError;
use alms_core::money::{to_minor_units, validate_currency};
use alms_core::types::DbId;
use alms_db::repositories::CauseRepo;
use alms_gateway::webhook::{verify_webhook_signature, WebhookEvent, SIGNATURE_HEADER};
use alms_gateway::InitializeRequest;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::normalize_email;
use crate::middleware::auth::OptionalAuthUser;
use crate::payments::{verify_and_record, VerificationOutcome};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /payments/initialize`. `amount` is in major units.
#[derive(Debug, Deserialize, Validate)]
pub struct InitializePaymentRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub cause_id: Option<DbId>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub donor_name: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub message: Option<String>,
}

/// Where to send the donor to complete payment.
#[derive(Debug, Serialize)]
pub struct InitializePaymentResponse {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/payments/initialize
///
/// Open a hosted checkout session. Nothing is written locally; the donation
/// row is created when the payment is verified.
pub async fn initialize_payment(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(mut input): Json<InitializePaymentRequest>,
) -> AppResult<Json<DataResponse<InitializePaymentResponse>>> {
    input.email = normalize_email(&input.email);
    input.validate()?;

    let amount_minor = to_minor_units(input.amount)?;

    let cause = match input.cause_id {
        Some(cause_id) => Some(CauseRepo::find_by_id(&state.pool, cause_id).await?.ok_or(
            AppError::Core(CoreError::NotFound {
                entity: "Cause",
                id: cause_id,
            }),
        )?),
        None => None,
    };

    // A cause is credited in its own currency only.
    let currency = match (input.currency, &cause) {
        (Some(currency), Some(cause)) if currency != cause.currency => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Cause '{}' accepts donations in {}, not {currency}",
                cause.title, cause.currency
            ))));
        }
        (Some(currency), _) => currency,
        (None, Some(cause)) => cause.currency.clone(),
        (None, None) => state.config.payment.default_currency.clone(),
    };
    validate_currency(&currency)?;

    if let Some(cause) = &cause {
        if !accepts_donations(&cause.status) {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Cause '{}' is not accepting donations",
                cause.title
            ))));
        }
    }

    let metadata = DonationMetadata {
        donor_name: input.donor_name.filter(|n| !n.trim().is_empty()),
        is_recurring: input.is_recurring,
        is_anonymous: input.is_anonymous,
        cause_id: input.cause_id,
        user_id: user.map(|u| u.user_id),
        message: input.message.filter(|m| !m.trim().is_empty()),
    };

    let request = InitializeRequest {
        email: input.email,
        amount_minor,
        currency,
        reference: generate_reference(),
        callback_url: Some(state.config.payment.callback_url.clone()),
        metadata: metadata.to_value(),
    };

    let checkout = state.gateway.initialize(&request).await?;

    tracing::info!(
        reference = %checkout.reference,
        amount_minor,
        cause_id = ?metadata.cause_id,
        "Checkout initialized"
    );

    Ok(Json(DataResponse {
        data: InitializePaymentResponse {
            authorization_url: checkout.authorization_url,
            access_code: checkout.access_code,
            reference: checkout.reference,
        },
    }))
}

/// POST /api/v1/payments/verify/{reference}
///
/// Called by the client after the gateway redirects back. Safe to repeat.
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<DataResponse<VerificationOutcome>>> {
    let outcome = verify_and_record(&state, &reference).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/payments/webhook
///
/// Gateway-to-server notification. The raw body must carry a valid HMAC
/// signature. `charge.success` events are re-verified with the gateway and
/// recorded through the same path as redirects; other events are
/// acknowledged and ignored.
///
/// A payment the gateway reports as unsuccessful is acknowledged with 200 so
/// the gateway stops retrying. Gateway and database failures return an error
/// so it retries later.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing webhook signature".into()))
        })?;

    if !verify_webhook_signature(&state.config.payment.secret_key, &body, signature) {
        tracing::warn!("Rejected webhook with invalid signature");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid webhook signature".into(),
        )));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    if !event.is_charge_success() {
        tracing::debug!(event = %event.event, "Ignoring webhook event");
        return Ok(StatusCode::OK);
    }

    let reference = event
        .reference()
        .ok_or_else(|| AppError::BadRequest("Webhook event has no reference".into()))?;

    match verify_and_record(&state, reference).await {
        Ok(outcome) => {
            tracing::info!(
                reference,
                donation_id = outcome.donation.id,
                already_recorded = outcome.already_recorded,
                "Webhook processed"
            );
            Ok(StatusCode::OK)
        }
        Err(AppError::PaymentNotSuccessful { status, .. }) => {
            tracing::info!(reference, %status, "Webhook for unsuccessful payment");
            Ok(StatusCode::OK)
        }
        Err(e) => Err(e),
    }
}
