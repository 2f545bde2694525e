//! In-process cache adapter.
//!
//! A `DashMap` of payloads with per-entry expiry. Suitable for a single
//! server instance and for tests; entries vanish on restart.
//!
//! Expired entries are dropped when read, and writes sweep the whole map at
//! most once per [`SWEEP_INTERVAL`] so keys that are never read again do not
//! accumulate.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use rates_types::{CacheError, CacheStore};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Minimum time between two write-triggered sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// TTL cache held in process memory.
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    last_sweep: Mutex<Instant>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, remaining = self.entries.len(), "Purged expired cache entries");
        }
    }

    /// Purges when the last sweep is older than [`SWEEP_INTERVAL`].
    fn maybe_sweep(&self) {
        let now = Instant::now();
        let due = match self.last_sweep.lock() {
            Ok(mut last) if now.duration_since(*last) >= SWEEP_INTERVAL => {
                *last = now;
                true
            }
            _ => false,
        };
        if due {
            self.purge_expired();
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
        }
        // The read guard above must be released before removing.
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn setex(&self, key: &str, ttl_seconds: u64, value: Vec<u8>) -> Result<(), CacheError> {
        self.maybe_sweep();
        if ttl_seconds == 0 {
            self.entries.remove(key);
            return Ok(());
        }
        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("rates:USD:EUR").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_setex_then_get_round_trip() {
        let cache = MemoryCache::new();
        let payload = br#"{"EUR":0.92}"#.to_vec();

        cache
            .setex("rates:USD:EUR", 60, payload.clone())
            .await
            .unwrap();

        assert_eq!(cache.get("rates:USD:EUR").await.unwrap(), Some(payload));
    }

    #[tokio::test]
    async fn test_setex_overwrites() {
        let cache = MemoryCache::new();
        cache.setex("k", 60, b"one".to_vec()).await.unwrap();
        cache.setex("k", 60, b"two".to_vec()).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache.setex("k", 10, b"v".to_vec()).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = MemoryCache::new();
        cache.setex("short", 1, b"a".to_vec()).await.unwrap();
        cache.setex("long", 100, b"b".to_vec()).await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        cache.purge_expired();

        assert_eq!(cache.len(), 1);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_sweep_keys_that_are_never_read() {
        let cache = MemoryCache::new();
        for i in 0..1000 {
            cache
                .setex(&format!("rates:B{i}:EUR"), 1, b"{}".to_vec())
                .await
                .unwrap();
        }
        assert_eq!(cache.len(), 1000);

        tokio::time::advance(Duration::from_secs(3600)).await;
        cache
            .setex("rates:USD:EUR", 60, br#"{"EUR":0.92}"#.to_vec())
            .await
            .unwrap();
        assert!(cache.get("rates:USD:EUR").await.unwrap().is_some());

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_waits_for_interval() {
        let cache = MemoryCache::new();
        cache.setex("old", 1, b"a".to_vec()).await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        cache.setex("new", 600, b"b".to_vec()).await.unwrap();
        assert_eq!(cache.len(), 2);

        tokio::time::advance(SWEEP_INTERVAL).await;
        cache.setex("newer", 60, b"c".to_vec()).await.unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.get("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_not_stored() {
        let cache = MemoryCache::new();
        cache.setex("k", 0, b"v".to_vec()).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }
}
