//! Payment gateway integration.
//!
//! The API talks to the gateway only through the [`PaymentGateway`] trait so
//! handlers and tests can swap in a fake. [`PaystackClient`] is the REST
//! implementation; [`webhook`] verifies signed webhook deliveries.

pub mod paystack;
pub mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use paystack::PaystackClient;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the payment gateway layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Gateway API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The gateway answered 2xx but with `status: false` in the envelope.
    #[error("Gateway rejected the request: {0}")]
    Rejected(String),

    /// The response body did not match the expected shape.
    #[error("Failed to decode gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Checkout initialization
// ---------------------------------------------------------------------------

/// Parameters for starting a hosted checkout.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub email: String,
    /// Amount in minor currency units.
    #[serde(rename = "amount")]
    pub amount_minor: i64,
    pub currency: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    pub metadata: serde_json::Value,
}

/// Hosted checkout session returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    /// URL the payer is redirected to.
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Outcome of a transaction as reported by the gateway.
///
/// Only [`TransactionStatus::Success`] means the money was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Success,
    Failed,
    Abandoned,
    Pending,
    Reversed,
    /// Any status string this client does not know about.
    Other(String),
}

impl TransactionStatus {
    /// Map the gateway's status string. Matching is case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "abandoned" => Self::Abandoned,
            "pending" | "ongoing" | "processing" | "queued" => Self::Pending,
            "reversed" => Self::Reversed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::Pending => "pending",
            Self::Reversed => "reversed",
            Self::Other(s) => s,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction as returned by the gateway's verify endpoint.
#[derive(Debug, Clone)]
pub struct VerifiedTransaction {
    /// Gateway-side transaction id.
    pub id: i64,
    pub status: TransactionStatus,
    pub reference: String,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    pub currency: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub customer_email: Option<String>,
    /// Metadata echoed back from initialization. May be any JSON value.
    pub metadata: serde_json::Value,
    /// Human-readable processor message, when the gateway provides one.
    pub gateway_response: Option<String>,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A payment gateway capable of hosted checkout and server-side verification.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a hosted checkout session.
    async fn initialize(&self, request: &InitializeRequest) -> Result<Checkout, GatewayError>;

    /// Fetch the authoritative state of a transaction by reference.
    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError>;
}
