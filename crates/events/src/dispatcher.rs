//! Event-to-email routing.
//!
//! [`NotificationDispatcher`] subscribes to the event bus and sends the
//! matching transactional email for the events that warrant one. The
//! recipient is the `email` field of the event payload; the rest of the
//! payload is handed to the template.

use std::sync::Arc;

use alms_core::aid_request::{AID_STATUS_APPROVED, AID_STATUS_REJECTED};
use tokio::sync::broadcast;

use crate::bus::{
    PlatformEvent, EVENT_AID_REQUEST_REVIEWED, EVENT_AID_REQUEST_SUBMITTED,
    EVENT_CONTACT_SUBMITTED, EVENT_DONATION_COMPLETED, EVENT_NEWSLETTER_SUBSCRIBED,
    EVENT_USER_REGISTERED,
};
use crate::delivery::email::{EmailError, Mailer, OutgoingEmail};
use crate::templates::{self, EmailKind};

/// Routes platform events to outbound emails.
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    site_url: String,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, site_url: impl Into<String>) -> Self {
        Self {
            mailer,
            site_url: site_url.into(),
        }
    }

    /// Run the dispatch loop until the channel closes.
    ///
    /// Send failures are logged; they never stop the loop.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.dispatch(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to send notification email"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Send the email for `event`, if it maps to one.
    ///
    /// Returns whether an email was sent.
    pub async fn dispatch(&self, event: &PlatformEvent) -> Result<bool, EmailError> {
        let Some(email) = self.email_for(event) else {
            return Ok(false);
        };
        self.mailer.send(&email).await?;
        Ok(true)
    }

    /// Build the email for `event` without sending it.
    pub fn email_for(&self, event: &PlatformEvent) -> Option<OutgoingEmail> {
        let kind = kind_for(event)?;
        let Some(to) = event.payload_str("email").filter(|e| !e.trim().is_empty()) else {
            tracing::warn!(
                event_type = %event.event_type,
                "Event has no recipient email, skipping notification"
            );
            return None;
        };
        let rendered = templates::render(kind, &event.payload, &self.site_url);
        Some(OutgoingEmail::new(to, rendered))
    }
}

/// Which template, if any, an event triggers.
fn kind_for(event: &PlatformEvent) -> Option<EmailKind> {
    match event.event_type.as_str() {
        EVENT_DONATION_COMPLETED => Some(EmailKind::DonationReceipt),
        EVENT_USER_REGISTERED => Some(EmailKind::Welcome),
        EVENT_AID_REQUEST_SUBMITTED => Some(EmailKind::AidRequestReceived),
        EVENT_AID_REQUEST_REVIEWED => match event.payload_str("status") {
            Some(AID_STATUS_APPROVED) => Some(EmailKind::AidRequestApproved),
            Some(AID_STATUS_REJECTED) => Some(EmailKind::AidRequestRejected),
            // Moving to under_review is not announced.
            _ => None,
        },
        EVENT_NEWSLETTER_SUBSCRIBED => Some(EmailKind::NewsletterWelcome),
        EVENT_CONTACT_SUBMITTED => Some(EmailKind::ContactReceived),
        _ => None,
    }
}
