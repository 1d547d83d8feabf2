use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use perch_storage::{FastCache, StorageError};

/// A cached entry with TTL support.
///
/// The data is wrapped in `Arc` so cache hits only bump a refcount.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Arc<Vec<u8>>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    /// Create a new cached entry.
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() >= self.ttl
    }

    /// Time left before expiry, or `None` once expired.
    pub fn remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.cached_at.elapsed()).filter(|d| !d.is_zero())
    }
}

/// Process-local fast cache backed by a DashMap.
///
/// Expired entries are dropped lazily on access.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFastCache {
    entries: Arc<DashMap<String, CachedEntry>>,
}

impl InMemoryFastCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remaining TTL for a key, if it is present and live.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.get(key).and_then(|entry| entry.remaining())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl FastCache for InMemoryFastCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.data.as_ref().clone()));
            }
            drop(entry);
            self.entries.remove(key);
            tracing::debug!(key = %key, "evicted expired entry");
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StorageError> {
        self.entries
            .insert(key.to_string(), CachedEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
