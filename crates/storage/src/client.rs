//! REST client for the storage service's object-signing endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{ObjectSigner, StorageError};

/// HTTP client for a storage service authenticated with a service key.
pub struct StorageClient {
    client: reqwest::Client,
    storage_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl StorageClient {
    /// Create a client for `storage_url`, e.g. `https://host/storage/v1`.
    pub fn new(
        storage_url: impl Into<String>,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let storage_url = storage_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            storage_url,
            service_key: service_key.into(),
        })
    }

    /// Resolve the service's answer to an absolute URL.
    ///
    /// The service returns a path relative to `storage_url`
    /// (`/object/sign/...?token=...`); absolute URLs pass through.
    fn absolute(&self, signed: &str) -> String {
        if signed.starts_with("http://") || signed.starts_with("https://") {
            signed.to_string()
        } else if signed.starts_with('/') {
            format!("{}{}", self.storage_url, signed)
        } else {
            format!("{}/{}", self.storage_url, signed)
        }
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ObjectSigner for StorageClient {
    async fn sign(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let response = self
            .client
            .post(format!("{}/object/sign/{}/{}", self.storage_url, bucket, path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&serde_json::json!({ "expiresIn": expires_in.as_secs() }))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        let parsed: SignResponse = serde_json::from_str(&body)?;

        tracing::debug!(bucket, path, "Signed storage object");
        Ok(self.absolute(&parsed.signed_url))
    }
}
