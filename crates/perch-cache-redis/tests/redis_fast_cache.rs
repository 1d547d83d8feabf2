//! Integration tests for the Redis fast cache.
//!
//! Tests use testcontainers to spin up a real Redis instance, so they need a
//! Docker daemon: `cargo test -p perch-cache-redis -- --ignored`.

use std::time::Duration;

use perch_cache_redis::{RedisConfig, create_fast_cache};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::Redis;
use tokio::sync::OnceCell;

// Shared Redis container for all tests
static SHARED_REDIS: OnceCell<(ContainerAsync<Redis>, String)> = OnceCell::const_new();

async fn get_redis_url() -> String {
    let (_, url) = SHARED_REDIS
        .get_or_init(|| async {
            let container = Redis::default()
                .start()
                .await
                .expect("start redis container");

            let host_port = container.get_host_port_ipv4(6379).await.expect("get port");
            let url = format!("redis://127.0.0.1:{host_port}");

            (container, url)
        })
        .await;

    url.clone()
}

#[tokio::test]
async fn test_disabled_redis_falls_back_to_memory() {
    let cache = create_fast_cache(&RedisConfig::default()).await;
    assert_eq!(cache.backend_name(), "memory");
}

#[tokio::test]
async fn test_unreachable_redis_falls_back_to_memory() {
    let config = RedisConfig {
        enabled: true,
        url: "redis://127.0.0.1:1".into(),
        max_connections: 1,
        timeout_ms: 200,
    };
    let cache = create_fast_cache(&config).await;
    assert_eq!(cache.backend_name(), "memory");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_redis_get_set_delete() {
    let config = RedisConfig {
        enabled: true,
        url: get_redis_url().await,
        max_connections: 5,
        timeout_ms: 5000,
    };
    let cache = create_fast_cache(&config).await;
    assert_eq!(cache.backend_name(), "redis");

    let key = "uobj__discord:123456789012345678";
    cache
        .set(key, b"{\"id\":\"1\"}".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(cache.get(key).await.unwrap(), Some(b"{\"id\":\"1\"}".to_vec()));

    assert!(cache.delete(key).await.unwrap());
    assert!(!cache.delete(key).await.unwrap());
    assert!(cache.get(key).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_redis_entry_expires() {
    let config = RedisConfig {
        enabled: true,
        url: get_redis_url().await,
        max_connections: 5,
        timeout_ms: 5000,
    };
    let cache = create_fast_cache(&config).await;

    cache
        .set("uobj__discord:expiring", b"v".to_vec(), Duration::from_secs(1))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(cache.get("uobj__discord:expiring").await.unwrap().is_none());
}
