//! In-memory cache of signed URLs.
//!
//! Entries are keyed by `(bucket, path)`. An entry is served while
//! `now + refresh_margin < expires_at`; after that the object is re-signed so
//! callers never receive a URL that is about to stop working. Time comes from
//! the tokio clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{ObjectSigner, StorageError};

/// A signed URL and how long it remains valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    /// Remaining validity at the time it was handed out.
    pub expires_in: Duration,
}

#[derive(Debug, Clone)]
struct CachedUrl {
    url: String,
    expires_at: Instant,
}

/// Thread-safe signed-URL cache in front of an [`ObjectSigner`].
///
/// Designed to be wrapped in `Arc` and shared across handlers.
pub struct SignedUrlCache {
    signer: Arc<dyn ObjectSigner>,
    ttl: Duration,
    refresh_margin: Duration,
    entries: RwLock<HashMap<(String, String), CachedUrl>>,
}

impl SignedUrlCache {
    /// Create a cache that signs URLs valid for `ttl` and refreshes them once
    /// less than `refresh_margin` of validity remains.
    ///
    /// A margin at or above `ttl` is reduced to half the ttl, otherwise every
    /// freshly signed entry would already be due for refresh.
    pub fn new(signer: Arc<dyn ObjectSigner>, ttl: Duration, refresh_margin: Duration) -> Self {
        let refresh_margin = if refresh_margin >= ttl {
            ttl / 2
        } else {
            refresh_margin
        };
        Self {
            signer,
            ttl,
            refresh_margin,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return a cached URL for `bucket/path`, signing a new one when the
    /// cached entry is missing or near expiry.
    pub async fn get_or_sign(&self, bucket: &str, path: &str) -> Result<SignedUrl, StorageError> {
        let key = (bucket.to_string(), path.to_string());
        let now = Instant::now();

        if let Some(entry) = self.entries.read().await.get(&key) {
            if now + self.refresh_margin < entry.expires_at {
                return Ok(SignedUrl {
                    url: entry.url.clone(),
                    expires_in: entry.expires_at - now,
                });
            }
        }

        let url = self.signer.sign(bucket, path, self.ttl).await?;
        let expires_at = now + self.ttl;
        self.entries.write().await.insert(
            key,
            CachedUrl {
                url: url.clone(),
                expires_at,
            },
        );

        Ok(SignedUrl {
            url,
            expires_in: self.ttl,
        })
    }

    /// Drop the cached entry for `bucket/path`. Returns whether one existed.
    pub async fn invalidate(&self, bucket: &str, path: &str) -> bool {
        self.entries
            .write()
            .await
            .remove(&(bucket.to_string(), path.to_string()))
            .is_some()
    }

    /// Remove every entry that has expired. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of cached entries, including stale ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    const TTL: Duration = Duration::from_secs(3600);
    const MARGIN: Duration = Duration::from_secs(300);

    /// Signer that counts calls and embeds the count in the URL.
    #[derive(Default)]
    struct CountingSigner {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ObjectSigner for CountingSigner {
        async fn sign(
            &self,
            bucket: &str,
            path: &str,
            _expires_in: Duration,
        ) -> Result<String, StorageError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("https://files.test/{bucket}/{path}?token={n}"))
        }
    }

    struct FailingSigner;

    #[async_trait]
    impl ObjectSigner for FailingSigner {
        async fn sign(&self, _: &str, _: &str, _: Duration) -> Result<String, StorageError> {
            Err(StorageError::Api {
                status: 404,
                body: "Object not found".into(),
            })
        }
    }

    fn cache() -> (Arc<CountingSigner>, SignedUrlCache) {
        let signer = Arc::new(CountingSigner::default());
        let cache = SignedUrlCache::new(signer.clone(), TTL, MARGIN);
        (signer, cache)
    }

    #[tokio::test(start_paused = true)]
    async fn test_serves_cached_url_while_fresh() {
        let (signer, cache) = cache();

        let first = cache.get_or_sign("avatars", "u1/me.png").await.unwrap();
        assert_eq!(first.expires_in, TTL);

        tokio::time::advance(Duration::from_secs(600)).await;
        let second = cache.get_or_sign("avatars", "u1/me.png").await.unwrap();

        assert_eq!(first.url, second.url);
        assert_eq!(second.expires_in, TTL - Duration::from_secs(600));
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resigns_inside_refresh_margin() {
        let (signer, cache) = cache();

        let first = cache.get_or_sign("avatars", "u1/me.png").await.unwrap();
        tokio::time::advance(TTL - MARGIN).await;
        let second = cache.get_or_sign("avatars", "u1/me.png").await.unwrap();

        assert_ne!(first.url, second.url);
        assert_eq!(second.expires_in, TTL);
        assert_eq!(signer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_bucket_and_path() {
        let (signer, cache) = cache();

        cache.get_or_sign("avatars", "a.png").await.unwrap();
        cache.get_or_sign("story-images", "a.png").await.unwrap();
        cache.get_or_sign("avatars", "b.png").await.unwrap();

        assert_eq!(signer.calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_resign() {
        let (signer, cache) = cache();

        cache.get_or_sign("avatars", "a.png").await.unwrap();
        assert!(cache.invalidate("avatars", "a.png").await);
        assert!(!cache.invalidate("avatars", "a.png").await);
        cache.get_or_sign("avatars", "a.png").await.unwrap();

        assert_eq!(signer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_drops_only_expired_entries() {
        let (_signer, cache) = cache();

        cache.get_or_sign("avatars", "old.png").await.unwrap();
        tokio::time::advance(Duration::from_secs(1800)).await;
        cache.get_or_sign("avatars", "new.png").await.unwrap();
        tokio::time::advance(Duration::from_secs(1801)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.purge_expired().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signer_errors_are_not_cached() {
        let cache = SignedUrlCache::new(Arc::new(FailingSigner), TTL, MARGIN);
        assert!(cache.get_or_sign("avatars", "missing.png").await.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_margin_is_halved() {
        let signer = Arc::new(CountingSigner::default());
        let cache = SignedUrlCache::new(signer.clone(), TTL, TTL * 2);

        cache.get_or_sign("avatars", "a.png").await.unwrap();
        cache.get_or_sign("avatars", "a.png").await.unwrap();
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }
}
