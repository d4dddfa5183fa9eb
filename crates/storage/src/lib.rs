//! Object storage access through short-lived signed URLs.
//!
//! Files are never exposed through permanent public URLs. [`ObjectSigner`]
//! asks the storage service for a time-limited URL; [`SignedUrlCache`] keeps
//! those URLs in memory until shortly before they expire.

pub mod cache;
pub mod client;

use std::time::Duration;

use async_trait::async_trait;

pub use cache::{SignedUrl, SignedUrlCache};
pub use client::StorageClient;

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage service returned a non-2xx status code.
    #[error("Storage API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to decode storage response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Produces signed URLs for stored objects.
#[async_trait]
pub trait ObjectSigner: Send + Sync {
    /// Return a URL granting read access to `bucket/path` for `expires_in`.
    async fn sign(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}
