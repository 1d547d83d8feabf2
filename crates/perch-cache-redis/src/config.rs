use std::time::Duration;

use deadpool_redis::{CreatePoolError, Pool, PoolConfig, Runtime};
use serde::{Deserialize, Serialize};

/// Settings for the Redis fast cache.
///
/// With `enabled = false` perch keeps `uobj__*` entries in process memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub enabled: bool,
    pub url: String,
    pub max_connections: usize,
    /// Applies to waiting for, creating and recycling a connection.
    pub timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "redis://localhost:6379".into(),
            max_connections: 8,
            timeout_ms: 2000,
        }
    }
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builds the connection pool. No connection is opened yet.
    pub fn build_pool(&self) -> Result<Pool, CreatePoolError> {
        let mut pool = PoolConfig::new(self.max_connections);
        pool.timeouts.wait = Some(self.timeout());
        pool.timeouts.create = Some(self.timeout());
        pool.timeouts.recycle = Some(self.timeout());

        let mut config = deadpool_redis::Config::from_url(&self.url);
        config.pool = Some(pool);
        config.create_pool(Some(Runtime::Tokio1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: RedisConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_build_pool_is_lazy() {
        let config = RedisConfig {
            url: "redis://127.0.0.1:1".into(),
            max_connections: 2,
            ..Default::default()
        };

        let pool = config.build_pool().unwrap();

        assert_eq!(pool.status().max_size, 2);
        assert_eq!(pool.status().size, 0);
    }
}
