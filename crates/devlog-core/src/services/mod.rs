//! Use-case services orchestrating the ports.

mod auth;
mod categories;
mod posts;
pub mod prepare;

pub use auth::AuthService;
pub use categories::CategoryService;
pub use posts::PostService;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ports::Cache;

/// TTL for the short-lived listings (related, trending).
pub(crate) const SHORT_TTL: Duration = Duration::from_secs(300);
/// TTL for the featured listing.
pub(crate) const FEATURED_TTL: Duration = Duration::from_secs(600);

/// Thin wrapper over the cache port that (de)serializes JSON snapshots
/// and swallows every cache failure. The cache is advisory: a failed
/// lookup is a miss, a failed write or invalidation is a log line, and
/// the store remains the source of truth either way.
#[derive(Clone)]
pub(crate) struct Snapshots {
    cache: Arc<dyn Cache>,
}

impl Snapshots {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, %err, "dropping undecodable cache entry");
                let _ = self.cache.delete(key).await;
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(key, %err, "failed to serialize cache snapshot");
                return;
            }
        };
        if let Err(err) = self.cache.set(key, &json, ttl).await {
            tracing::warn!(key, %err, "cache set failed");
        }
    }

    pub async fn remove(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            tracing::warn!(key, %err, "cache delete failed");
        }
    }

    pub async fn remove_prefix(&self, prefix: &str) {
        if let Err(err) = self.cache.delete_by_prefix(prefix).await {
            tracing::warn!(prefix, %err, "cache prefix invalidation failed");
        }
    }
}
