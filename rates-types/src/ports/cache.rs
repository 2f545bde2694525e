//! Cache store port.
//!
//! A key/value store with TTL expiry. Redis in production, an in-process map
//! in tests and single-node deployments.

use crate::error::CacheError;

#[async_trait::async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Returns the stored payload, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key` for `ttl_seconds`, replacing any previous value.
    async fn setex(&self, key: &str, ttl_seconds: u64, value: Vec<u8>) -> Result<(), CacheError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), CacheError>;
}
