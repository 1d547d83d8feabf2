//! # perch-storage
//!
//! Storage ports consumed by the perch resolver.
//!
//! This crate defines the traits the two durable cache tiers must implement.
//! It does not contain any implementations - those are provided by separate
//! crates (`perch-db-postgres`, `perch-db-memory`, `perch-cache-redis`).
//!
//! ## Overview
//!
//! - [`FastCache`]: low-latency key-value store with per-key TTL
//! - [`UserStore`]: durable, relational per-platform user table
//!
//! ## Example
//!
//! ```ignore
//! use perch_storage::{FastCache, StorageResult};
//!
//! async fn cached_bytes(cache: &dyn FastCache, key: &str) -> StorageResult<usize> {
//!     Ok(cache.get(key).await?.map(|b| b.len()).unwrap_or(0))
//! }
//! ```

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::{FastCache, UserStore};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shareable fast cache.
pub type DynFastCache = std::sync::Arc<dyn FastCache>;

/// Type alias for a shareable persistent user store.
pub type DynUserStore = std::sync::Arc<dyn UserStore>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use perch_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::traits::{FastCache, UserStore};
    pub use crate::{DynFastCache, DynUserStore, StorageResult};
}
