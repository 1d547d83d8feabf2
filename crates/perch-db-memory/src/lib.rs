//! In-memory storage backends for perch.
//!
//! This crate provides in-memory implementations of the `UserStore` and
//! `FastCache` traits from `perch-storage`, using DashMap for concurrent
//! access. They back single-instance deployments and the resolver's tests.
//!
//! # Example
//!
//! ```ignore
//! use perch_db_memory::{InMemoryFastCache, InMemoryUserStore};
//!
//! let store = InMemoryUserStore::new();
//! store.ensure_table("discord").await?;
//! ```

pub mod fast_cache;
pub mod user_store;

pub use fast_cache::{CachedEntry, InMemoryFastCache};
pub use user_store::InMemoryUserStore;

// Re-export the storage traits for convenience
pub use perch_storage::{DynFastCache, DynUserStore, FastCache, StorageError, UserStore};

/// Creates a new shareable in-memory user store.
pub fn create_user_store() -> DynUserStore {
    std::sync::Arc::new(InMemoryUserStore::new())
}

/// Creates a new shareable in-memory fast cache.
pub fn create_fast_cache() -> DynFastCache {
    std::sync::Arc::new(InMemoryFastCache::new())
}
