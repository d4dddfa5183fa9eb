//! Email delivery via SMTP.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. Configuration is
//! loaded from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and the application falls back to
//! [`LogMailer`], which only logs.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::templates::RenderedEmail;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@alms.local";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default              |
    /// |-----------------|----------|----------------------|
    /// | `SMTP_HOST`     | yes      | --                   |
    /// | `SMTP_PORT`     | no       | `587`                |
    /// | `SMTP_FROM`     | no       | `noreply@alms.local` |
    /// | `SMTP_USER`     | no       | --                   |
    /// | `SMTP_PASSWORD` | no       | --                   |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// A single message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, rendered: RenderedEmail) -> Self {
        Self {
            to: to.into(),
            subject: rendered.subject,
            text: rendered.text,
            html: rendered.html,
        }
    }
}

/// A transactional email provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Sends email through an SMTP relay using STARTTLS.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. Fails on an invalid sender address or relay host.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from: Mailbox = config.from_address.parse()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = build_message(self.from.clone(), email)?;
        self.transport.send(message).await?;
        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Assemble a `multipart/alternative` message with text and HTML parts.
fn build_message(from: Mailbox, email: &OutgoingEmail) -> Result<Message, EmailError> {
    let to: Mailbox = email.to.parse()?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
        .map_err(|e| EmailError::Build(e.to_string()))
}

// ---------------------------------------------------------------------------
// LogMailer
// ---------------------------------------------------------------------------

/// Mailer used when SMTP is not configured: logs the message and drops it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        // Validate the address so callers see the same errors as with SMTP.
        let _: Mailbox = email.to.parse()?;
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email logged and dropped"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
