//! Redis fast cache for perch.
//!
//! ## Graceful Degradation
//!
//! If Redis is disabled or unreachable at startup, [`create_fast_cache`]
//! falls back to the in-memory fast cache so resolution keeps working on a
//! single instance.

mod backend;
mod config;

pub use backend::RedisFastCache;
pub use config::RedisConfig;

use std::sync::Arc;

use perch_db_memory::InMemoryFastCache;
use perch_storage::DynFastCache;

/// Create a fast cache based on configuration.
///
/// - **Redis disabled**: returns the in-memory fast cache
/// - **Redis enabled**: connects to Redis, falls back to in-memory on failure
pub async fn create_fast_cache(config: &RedisConfig) -> DynFastCache {
    if !config.enabled {
        tracing::info!("Redis disabled, using in-memory fast cache");
        return Arc::new(InMemoryFastCache::new());
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let pool = match config.build_pool() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to in-memory fast cache."
            );
            return Arc::new(InMemoryFastCache::new());
        }
    };

    let cache = RedisFastCache::new(pool);
    match cache.ping().await {
        Ok(()) => {
            tracing::info!("Connected to Redis");
            Arc::new(cache)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to in-memory fast cache."
            );
            Arc::new(InMemoryFastCache::new())
        }
    }
}
