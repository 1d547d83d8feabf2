//! The adapter contract implemented once per external identity platform.

use std::sync::Arc;

use async_trait::async_trait;

use crate::user::PlatformUser;

/// Errors reported by a platform adapter.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The identity failed the platform's syntactic check.
    #[error("Invalid identity '{id}': {reason}")]
    InvalidIdentity { id: String, reason: String },

    /// The platform has no user with this identity.
    #[error("User not found: {0}")]
    NotFound(String),

    /// The platform could not be reached.
    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    /// The platform answered with an unexpected HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The platform's response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The adapter is misconfigured.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl PlatformError {
    #[must_use]
    pub fn invalid_identity(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for adapter operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Capability set of an external identity platform.
///
/// The caller constructs and owns the adapter. The resolver borrows it per
/// call and runs [`Platform::initialize`] once, before first use.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Name used to namespace the persistent table and fast-cache keys.
    ///
    /// Must satisfy [`crate::validate_platform_name`].
    fn name(&self) -> &str;

    /// Checks the identity's format and returns its normalized form.
    fn validate_identity(&self, raw: &str) -> PlatformResult<String>;

    /// One-time setup. Calling it on an initialized adapter is a no-op.
    async fn initialize(&self) -> PlatformResult<()>;

    /// Whether [`Platform::initialize`] has completed.
    fn is_initialized(&self) -> bool;

    /// Looks the identity up in state the platform connection already holds.
    ///
    /// Must not perform network I/O. `Ok(None)` means "not resident"; an
    /// error aborts resolution.
    async fn live_state_probe(&self, id: &str) -> PlatformResult<Option<PlatformUser>>;

    /// Authoritative fetch from the platform.
    async fn remote_fetch(&self, id: &str) -> PlatformResult<PlatformUser>;
}

/// Type alias for a shareable platform adapter.
pub type DynPlatform = Arc<dyn Platform>;
