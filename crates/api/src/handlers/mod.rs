//! Request handlers grouped by resource.
//!
//! Handlers validate input, delegate to the repositories in `alms_db` (or to
//! [`crate::payments`] for donations) and map errors via
//! [`AppError`](crate::error::AppError). Side effects are published on the
//! event bus.

pub mod admin;
pub mod aid_requests;
pub mod auth;
pub mod causes;
pub mod contact;
pub mod content;
pub mod donations;
pub mod newsletter;
pub mod notifications;
pub mod payments;
pub mod settings;
pub mod storage;

/// Trim and lowercase an email address. Runs before validation so padded
/// input is accepted.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
