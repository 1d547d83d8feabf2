//! Fast cache over a shared Redis instance.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::Pool;
use perch_storage::{FastCache, StorageError};
use redis::AsyncCommands;

/// Fast cache backed by Redis `GET`/`SET EX`/`DEL`.
#[derive(Clone)]
pub struct RedisFastCache {
    pool: Pool,
}

impl RedisFastCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, StorageError> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::connection(format!("Redis connection error: {e}")))
    }

    /// Checks out a connection, which opens one if the pool is empty.
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.conn().await.map(drop)
    }
}

/// `SET EX` rejects a zero expiry; round sub-second TTLs up to one second.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl FastCache for RedisFastCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| StorageError::query(format!("Redis GET error: {e}")))?;
        tracing::debug!(key = %key, hit = value.is_some(), "redis get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StorageError> {
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs(ttl))
            .await
            .map_err(|e| StorageError::query(format!("Redis SET error: {e}")))?;
        tracing::debug!(key = %key, ttl_secs = ttl_secs(ttl), "redis set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let mut conn = self.conn().await?;
        let removed: u64 = conn
            .del(key)
            .await
            .map_err(|e| StorageError::query(format!("Redis DEL error: {e}")))?;
        Ok(removed > 0)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
