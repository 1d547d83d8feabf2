//! Storage traits for the two durable cache tiers.

use std::time::Duration;

use async_trait::async_trait;
use perch_core::{PlatformUser, UserRecord};

use crate::error::StorageError;

/// Low-latency key-value store with per-key TTL.
///
/// Values are opaque bytes; callers own the encoding. Implementations must be
/// thread-safe (`Send + Sync`).
#[async_trait]
pub trait FastCache: Send + Sync {
    /// Reads a value. Returns `None` if the key is absent or expired.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing keys.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Writes a value, replacing any previous one, expiring after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StorageError>;

    /// Deletes a key. Returns `true` if a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Durable per-platform user table.
///
/// Every method takes the platform name; the backend maps it to
/// `internal_user_cache__<platform>`. Records are replaced wholesale, never
/// patched field by field.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the platform's table if it does not exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPlatform` if the platform name is not a
    /// safe identifier.
    async fn ensure_table(&self, platform: &str) -> Result<(), StorageError>;

    /// Returns whether a row exists for the identity.
    async fn exists(&self, platform: &str, id: &str) -> Result<bool, StorageError>;

    /// Reads a row by identity.
    ///
    /// Returns `None` if the row does not exist.
    async fn find(&self, platform: &str, id: &str) -> Result<Option<UserRecord>, StorageError>;

    /// Inserts the user, or updates every mutable column and `last_updated`
    /// when a row with the same identity already exists.
    async fn upsert(&self, platform: &str, user: &PlatformUser) -> Result<(), StorageError>;

    /// Deletes a row by identity. Returns `true` if a row was removed.
    async fn delete(&self, platform: &str, id: &str) -> Result<bool, StorageError>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
