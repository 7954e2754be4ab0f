//! Response cache port.
//!
//! Values are JSON snapshots of shaped responses. A value handed back by
//! `get` is an immutable snapshot: deserialize and use it, never patch it
//! and write it back. The cache is advisory only - every read path has a
//! correct cache-free fallback, so implementations may fail freely and
//! callers swallow (and log) the error.

use async_trait::async_trait;
use std::time::Duration;

/// Cache trait - process-local key/value store with per-entry TTL and
/// prefix-based bulk invalidation.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from the cache.
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value with optional TTL; `None` uses the configured default.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Delete every live key starting with `prefix`. Linear scan over the
    /// key set; fine at this scale.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError>;

    /// Check if a key exists (and has not expired).
    async fn exists(&self, key: &str) -> bool;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
