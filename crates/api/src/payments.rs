//! Donation verification service.
//!
//! Turns a gateway transaction reference into exactly one completed donation:
//!
//! 1. A reference already recorded is returned as-is; the gateway is not
//!    called again.
//! 2. The gateway's verify endpoint is the source of truth. Anything other
//!    than `success` is rejected and nothing is written.
//! 3. The donation is inserted with `ON CONFLICT (payment_reference) DO
//!    NOTHING`, so a redirect and a webhook racing on the same reference
//!    record it once and credit the cause once.
//! 4. Activity logging and the receipt email are published on the event bus
//!    after the insert commits. They never fail the request.

use alms_core::donation::{validate_reference, DonationMetadata, DONATION_STATUS_COMPLETED};
use alms_db::models::donation::{CreateDonation, Donation};
use alms_db::repositories::{CauseRepo, DonationRepo};
use alms_events::bus::EVENT_DONATION_COMPLETED;
use alms_events::PlatformEvent;
use alms_gateway::{GatewayError, VerifiedTransaction};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Result of verifying a reference.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub donation: Donation,
    /// `true` when the donation had been recorded by an earlier call.
    pub already_recorded: bool,
}

/// Verify `reference` with the gateway and record the donation once.
pub async fn verify_and_record(state: &AppState, reference: &str) -> AppResult<VerificationOutcome> {
    validate_reference(reference)?;

    if let Some(existing) = DonationRepo::find_by_reference(&state.pool, reference).await? {
        tracing::debug!(reference, donation_id = existing.id, "Reference already recorded");
        return Ok(VerificationOutcome {
            donation: existing,
            already_recorded: true,
        });
    }

    let transaction = state.gateway.verify(reference).await?;

    if transaction.reference != reference {
        return Err(AppError::Gateway(GatewayError::Rejected(format!(
            "verification returned reference '{}' for '{reference}'",
            transaction.reference
        ))));
    }

    if !transaction.status.is_success() {
        tracing::info!(
            reference,
            status = %transaction.status,
            gateway_response = transaction.gateway_response.as_deref().unwrap_or(""),
            "Payment not successful"
        );
        return Err(AppError::PaymentNotSuccessful {
            reference: reference.to_string(),
            status: transaction.status.to_string(),
        });
    }

    record_transaction(state, &transaction).await
}

/// Record a transaction the gateway has confirmed as successful.
async fn record_transaction(
    state: &AppState,
    transaction: &VerifiedTransaction,
) -> AppResult<VerificationOutcome> {
    let Some(donor_email) = transaction.customer_email.clone() else {
        return Err(AppError::Gateway(GatewayError::Rejected(format!(
            "transaction '{}' has no customer email",
            transaction.reference
        ))));
    };

    let metadata = DonationMetadata::from_value(&transaction.metadata);
    let input = build_donation(transaction, donor_email, &metadata);

    let recorded = DonationRepo::record_completed(&state.pool, &input)
        .await
        .map_err(|e| {
            // The money has been captured at this point.
            tracing::error!(
                reference = %transaction.reference,
                amount_minor = transaction.amount_minor,
                currency = %transaction.currency,
                error = %e,
                "Payment captured but donation could not be recorded"
            );
            AppError::Database(e)
        })?;

    if recorded.created {
        tracing::info!(
            reference = %recorded.donation.payment_reference,
            donation_id = recorded.donation.id,
            amount_minor = recorded.donation.amount_minor,
            "Donation recorded"
        );
        publish_completed(state, &recorded.donation, &metadata).await;
    }

    Ok(VerificationOutcome {
        donation: recorded.donation,
        already_recorded: !recorded.created,
    })
}

fn build_donation(
    transaction: &VerifiedTransaction,
    donor_email: String,
    metadata: &DonationMetadata,
) -> CreateDonation {
    CreateDonation {
        payment_reference: transaction.reference.clone(),
        gateway_transaction_id: Some(transaction.id.to_string()),
        cause_id: metadata.cause_id,
        user_id: metadata.user_id,
        donor_email,
        donor_name: metadata.donor_name.clone(),
        amount_minor: transaction.amount_minor,
        currency: transaction.currency.clone(),
        is_recurring: metadata.is_recurring,
        is_anonymous: metadata.is_anonymous,
        message: metadata.message.clone(),
        status: DONATION_STATUS_COMPLETED.to_string(),
        paid_at: transaction.paid_at,
        metadata: transaction.metadata.clone(),
    }
}

/// Publish `donation.completed` for the activity log and the receipt email.
async fn publish_completed(state: &AppState, donation: &Donation, metadata: &DonationMetadata) {
    let cause_title = match donation.cause_id {
        Some(id) => match CauseRepo::find_by_id(&state.pool, id).await {
            Ok(cause) => cause.map(|c| c.title),
            Err(e) => {
                tracing::warn!(cause_id = id, error = %e, "Could not load cause for receipt");
                None
            }
        },
        None => None,
    };

    let payload = serde_json::json!({
        "email": donation.donor_email,
        "donor_name": metadata.display_name(),
        "amount": donation.amount(),
        "currency": donation.currency,
        "reference": donation.payment_reference,
        "cause_id": donation.cause_id,
        "cause_title": cause_title,
        "is_recurring": donation.is_recurring,
        "is_anonymous": donation.is_anonymous,
    });

    state.event_bus.publish(
        PlatformEvent::new(EVENT_DONATION_COMPLETED)
            .with_source("donation", donation.id)
            .with_optional_actor(donation.user_id)
            .with_payload(payload),
    );
}
