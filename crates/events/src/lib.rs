//! Alms event bus and notification infrastructure.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the canonical domain event envelope.
//! - [`ActivityLogger`] -- background service that appends every event to
//!   the `activity_log` table.
//! - [`NotificationDispatcher`] -- background service that turns events into
//!   transactional emails.
//! - [`templates`] -- the fixed set of email templates.
//! - [`delivery`] -- outbound email transports.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod persistence;
pub mod templates;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use dispatcher::NotificationDispatcher;
pub use persistence::ActivityLogger;
pub use templates::{EmailKind, RenderedEmail};
