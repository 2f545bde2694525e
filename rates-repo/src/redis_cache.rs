//! Redis cache adapter.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use rates_types::{CacheError, CacheStore};

/// Cache backed by Redis `GET` / `SETEX`.
///
/// The connection manager reconnects on its own; a call made while Redis is
/// down fails with [`CacheError::Unavailable`].
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis, e.g. `redis://localhost:6379/0`.
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

fn map_redis_error(err: redis::RedisError) -> CacheError {
    let unavailable = err.is_io_error() || err.is_connection_refusal() || err.is_timeout();
    tracing::debug!(error = %err, unavailable, "Redis command failed");
    if unavailable {
        CacheError::Unavailable(err.to_string())
    } else {
        CacheError::Backend(err.to_string())
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let payload: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(payload)
    }

    async fn setex(&self, key: &str, ttl_seconds: u64, value: Vec<u8>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, ttl_seconds)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}
