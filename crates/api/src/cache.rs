//! Read-through cache for the public product listing.
//!
//! The cache is an explicit capability the listing service depends on, not
//! a concrete store. Payloads are serialized JSON, kept for a TTL fixed at
//! construction, and never invalidated by product writes: within the TTL
//! window, read-after-write is not guaranteed. Concurrent misses may each
//! recompute and overwrite the same key; per-key writes are idempotent, so
//! the race is harmless.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

/// How long a cached listing page stays valid.
pub const LISTING_TTL: Duration = Duration::from_secs(20);

/// Key for one listing page.
#[must_use]
pub fn page_key(page: i64) -> String {
    format!("product_page_{page}")
}

/// Capability interface for the listing cache.
#[async_trait]
pub trait ListingCache: Send + Sync {
    /// The payload stored under `key`, if present and unexpired.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `payload` under `key` for the cache's TTL.
    async fn put(&self, key: String, payload: String);
}

/// In-process `ListingCache` backed by `moka`.
pub struct MokaListingCache {
    cache: Cache<String, String>,
}

impl MokaListingCache {
    /// Build a cache whose entries expire `ttl` after insertion.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1024)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl ListingCache for MokaListingCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await
    }

    async fn put(&self, key: String, payload: String) {
        self.cache.insert(key, payload).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key() {
        assert_eq!(page_key(1), "product_page_1");
        assert_eq!(page_key(42), "product_page_42");
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MokaListingCache::new(Duration::from_secs(20));
        cache
            .put(page_key(1), "{\"data\":[]}".to_owned())
            .await;
        assert_eq!(cache.get("product_page_1").await.as_deref(), Some("{\"data\":[]}"));
        assert!(cache.get("product_page_2").await.is_none());
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = MokaListingCache::new(Duration::from_millis(50));
        cache.put(page_key(1), "payload".to_owned()).await;
        assert!(cache.get("product_page_1").await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.get("product_page_1").await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_is_idempotent_per_key() {
        let cache = MokaListingCache::new(Duration::from_secs(20));
        cache.put(page_key(1), "first".to_owned()).await;
        cache.put(page_key(1), "first".to_owned()).await;
        assert_eq!(cache.get("product_page_1").await.as_deref(), Some("first"));
    }
}
