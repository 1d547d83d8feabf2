//! Error types for user resolution

use perch_core::PlatformError;
use perch_storage::StorageError;
use thiserror::Error;

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that can occur while resolving or invalidating a user
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Identity failed the platform's validation; no tier was touched
    #[error("Invalid identity for {platform}: {source}")]
    InvalidIdentity {
        platform: String,
        source: PlatformError,
    },

    /// Table creation or the adapter's own initialization failed
    #[error("Failed to initialize platform {platform}: {message}")]
    AdapterInitFailed { platform: String, message: String },

    /// `initialize()` returned but the adapter still reports uninitialized
    #[error("Platform {platform} did not report initialized after initialize()")]
    AdapterNotInitialized { platform: String },

    /// Live-state probe reported an error
    #[error("Live-state probe failed on {platform}: {source}")]
    LiveStateProbeFailed {
        platform: String,
        source: PlatformError,
    },

    /// Persistent store error
    #[error("Persistent store unavailable: {0}")]
    PersistentStoreUnavailable(#[source] StorageError),

    /// Fast cache error
    #[error("Fast cache unavailable: {0}")]
    FastCacheUnavailable(#[source] StorageError),

    /// Remote fetch failed; there is no further fallback
    #[error("Failed to fetch user from {platform}: {source}")]
    RemoteFetchFailed {
        platform: String,
        source: PlatformError,
    },

    /// A middleware rejected the user; the persist step was aborted
    #[error("Middleware {index} failed: {source}")]
    MiddlewareFailed {
        index: usize,
        source: MiddlewareError,
    },
}

impl ResolveError {
    /// Check if this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidIdentity { .. })
            || matches!(
                self,
                Self::RemoteFetchFailed { source, .. } if source.is_not_found()
            )
    }
}

/// Error returned by a middleware
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct MiddlewareError {
    message: String,
}

impl MiddlewareError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for MiddlewareError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for MiddlewareError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
