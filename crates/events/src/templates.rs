//! Transactional email templates.
//!
//! Each [`EmailKind`] renders a subject, a plain-text body and an HTML body
//! from a loose JSON data object. Missing fields fall back to neutral
//! wording. Every interpolated value is HTML-escaped in the HTML body.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Product name used in subjects and signatures.
pub const SITE_NAME: &str = "Alms";

/// The fixed set of emails the platform sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    DonationReceipt,
    Welcome,
    AidRequestReceived,
    AidRequestApproved,
    AidRequestRejected,
    ContactReceived,
    NewsletterWelcome,
}

impl EmailKind {
    pub const ALL: [EmailKind; 7] = [
        Self::DonationReceipt,
        Self::Welcome,
        Self::AidRequestReceived,
        Self::AidRequestApproved,
        Self::AidRequestRejected,
        Self::ContactReceived,
        Self::NewsletterWelcome,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DonationReceipt => "donation_receipt",
            Self::Welcome => "welcome",
            Self::AidRequestReceived => "aid_request_received",
            Self::AidRequestApproved => "aid_request_approved",
            Self::AidRequestRejected => "aid_request_rejected",
            Self::ContactReceived => "contact_received",
            Self::NewsletterWelcome => "newsletter_welcome",
        }
    }
}

impl fmt::Display for EmailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an email type tag is not one of [`EmailKind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown email type '{0}'")]
pub struct UnknownEmailKind(pub String);

impl FromStr for EmailKind {
    type Err = UnknownEmailKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEmailKind(s.to_string()))
    }
}

/// A fully rendered email, ready for a [`Mailer`](crate::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render `kind` with `data`. `site_url` is linked from the footer.
pub fn render(kind: EmailKind, data: &Value, site_url: &str) -> RenderedEmail {
    let name = field(data, "name")
        .or_else(|| field(data, "donor_name"))
        .or_else(|| field(data, "full_name"))
        .unwrap_or_else(|| "friend".to_string());

    let (subject, paragraphs) = match kind {
        EmailKind::DonationReceipt => {
            let amount = field(data, "amount").unwrap_or_default();
            let currency = field(data, "currency").unwrap_or_default();
            let reference = field(data, "reference").unwrap_or_default();
            let cause = field(data, "cause_title")
                .map(|title| format!(" towards \"{title}\""))
                .unwrap_or_default();
            let mut lines = vec![
                format!("Thank you for your donation of {currency} {amount}{cause}."),
                format!("Payment reference: {reference}"),
            ];
            if data.get("is_recurring").and_then(Value::as_bool) == Some(true) {
                lines.push("This is a recurring donation. Thank you for your continued support.".to_string());
            }
            lines.push("Please keep this email as your receipt.".to_string());
            (format!("Your {SITE_NAME} donation receipt"), lines)
        }
        EmailKind::Welcome => (
            format!("Welcome to {SITE_NAME}"),
            vec![
                "Your account has been created.".to_string(),
                "You can now track your donations and submit aid requests.".to_string(),
            ],
        ),
        EmailKind::AidRequestReceived => {
            let title = field(data, "title").unwrap_or_else(|| "your request".to_string());
            (
                "We received your aid request".to_string(),
                vec![
                    format!("We have received \"{title}\" and our team will review it shortly."),
                    "We will email you as soon as a decision is made.".to_string(),
                ],
            )
        }
        EmailKind::AidRequestApproved => {
            let title = field(data, "title").unwrap_or_else(|| "your request".to_string());
            let mut lines = vec![format!("Good news: \"{title}\" has been approved.")];
            if let Some(notes) = field(data, "review_notes") {
                lines.push(format!("Notes from our team: {notes}"));
            }
            lines.push("We will be in touch about next steps.".to_string());
            ("Your aid request was approved".to_string(), lines)
        }
        EmailKind::AidRequestRejected => {
            let title = field(data, "title").unwrap_or_else(|| "your request".to_string());
            let mut lines = vec![format!(
                "After careful review we are unable to support \"{title}\" at this time."
            )];
            if let Some(notes) = field(data, "review_notes") {
                lines.push(format!("Notes from our team: {notes}"));
            }
            ("Update on your aid request".to_string(), lines)
        }
        EmailKind::ContactReceived => {
            let topic = field(data, "subject").unwrap_or_else(|| "your message".to_string());
            (
                "We received your message".to_string(),
                vec![
                    format!("Thanks for contacting us about \"{topic}\"."),
                    "A member of our team will reply within two working days.".to_string(),
                ],
            )
        }
        EmailKind::NewsletterWelcome => (
            format!("You're subscribed to the {SITE_NAME} newsletter"),
            vec![
                "You will now receive updates on causes and the people you help.".to_string(),
                "You can unsubscribe at any time.".to_string(),
            ],
        ),
    };

    let greeting = format!("Hello {name},");
    let signature = format!("The {SITE_NAME} team");

    let mut text = format!("{greeting}\n\n");
    for p in &paragraphs {
        text.push_str(p);
        text.push_str("\n\n");
    }
    text.push_str(&format!("{signature}\n{site_url}\n"));

    let mut html = format!("<p>{}</p>\n", escape_html(&greeting));
    for p in &paragraphs {
        html.push_str(&format!("<p>{}</p>\n", escape_html(p)));
    }
    html.push_str(&format!(
        "<p>{}<br><a href=\"{url}\">{url}</a></p>\n",
        escape_html(&signature),
        url = escape_html(site_url)
    ));

    RenderedEmail {
        subject,
        text,
        html,
    }
}

/// Read `key` as display text; numbers and booleans are stringified.
fn field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
