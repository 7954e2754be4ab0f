//! In-memory response cache: per-entry TTL, lazy expiry and prefix-based
//! bulk invalidation.
//!
//! Process-local by design. A multi-instance deployment serves stale
//! reads until TTL expiry after a write on another instance; replacing
//! this with a shared tier is an explicit, separate decision.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use devlog_core::ports::{Cache, CacheError};

/// Default TTL applied when `set` is called without one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory cache using a HashMap behind an async RwLock.
///
/// Entries expire lazily: an expired entry is dropped on the read that
/// finds it. Data is lost on process restart, which is fine for a cache.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        Instant::now() > entry.expires_at
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if Self::is_expired(entry) {
            drop(store);
            let mut store = self.store.write().await;
            store.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;

        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);

        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        // linear scan over live keys; acceptable at this scale
        let mut store = self.store.write().await;
        store.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
        assert!(cache.exists("key1").await);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        cache.delete("key1").await.unwrap();
        assert_eq!(cache.get("key1").await, None);
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let cache = InMemoryCache::new();
        cache
            .set("key1", "value1", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("key1").await, None);
    }

    #[tokio::test]
    async fn prefix_delete_spares_other_keys() {
        let cache = InMemoryCache::new();
        cache.set("posts:list:a", "1", None).await.unwrap();
        cache.set("posts:featured:10", "2", None).await.unwrap();
        cache.set("categories:list:a", "3", None).await.unwrap();

        cache.delete_by_prefix("posts:").await.unwrap();

        assert_eq!(cache.get("posts:list:a").await, None);
        assert_eq!(cache.get("posts:featured:10").await, None);
        assert_eq!(cache.get("categories:list:a").await, Some("3".to_string()));
    }
}
