//! REST client for a Paystack-compatible gateway.
//!
//! Every response is wrapped in an envelope `{status, message, data}`.
//! Non-2xx responses and `status: false` envelopes are both errors.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    Checkout, GatewayError, InitializeRequest, PaymentGateway, TransactionStatus,
    VerifiedTransaction,
};

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

/// Default timeout for a single gateway call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the gateway's transaction endpoints.
pub struct PaystackClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    id: i64,
    status: String,
    reference: String,
    amount: i64,
    currency: String,
    paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    customer: Option<Customer>,
    #[serde(default)]
    metadata: serde_json::Value,
    gateway_response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Customer {
    email: Option<String>,
}

impl From<VerifyData> for VerifiedTransaction {
    fn from(data: VerifyData) -> Self {
        Self {
            id: data.id,
            status: TransactionStatus::parse(&data.status),
            reference: data.reference,
            amount_minor: data.amount,
            currency: data.currency,
            paid_at: data.paid_at,
            customer_email: data.customer.and_then(|c| c.email),
            metadata: data.metadata,
            gateway_response: data.gateway_response,
        }
    }
}

impl PaystackClient {
    /// Create a client for `base_url` authenticating with `secret_key`.
    ///
    /// * `base_url` - e.g. `https://api.paystack.co` (no trailing slash).
    /// * `timeout` - per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, secret_key))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            secret_key: secret_key.into(),
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, returning it unchanged
    /// or a [`GatewayError::Api`] carrying the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Decode the envelope and unwrap its `data`.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        if !envelope.status {
            return Err(GatewayError::Rejected(envelope.message));
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::Rejected(format!("missing data: {}", envelope.message)))
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, request: &InitializeRequest) -> Result<Checkout, GatewayError> {
        tracing::debug!(
            reference = %request.reference,
            amount_minor = request.amount_minor,
            currency = %request.currency,
            "Initializing checkout"
        );

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        let response = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let data: VerifyData = Self::parse_response(response).await?;
        Ok(data.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client =
            PaystackClient::with_client(reqwest::Client::new(), "http://gw.test/", "sk_test");
        assert_eq!(client.base_url, "http://gw.test");
    }

    #[test]
    fn test_verify_data_tolerates_empty_metadata_and_missing_customer() {
        let data: VerifyData = serde_json::from_value(serde_json::json!({
            "id": 99,
            "status": "abandoned",
            "reference": "ref-1",
            "amount": 1000,
            "currency": "NGN",
            "paid_at": null,
            "metadata": "",
            "gateway_response": null,
        }))
        .unwrap();
        let tx = VerifiedTransaction::from(data);
        assert_eq!(tx.status, TransactionStatus::Abandoned);
        assert_eq!(tx.customer_email, None);
        assert_eq!(tx.metadata, serde_json::json!(""));
    }
}
