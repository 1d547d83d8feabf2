//! Transformations applied to a user before it is written back to the caches.

use std::sync::Arc;

use async_trait::async_trait;
use perch_core::{Platform, PlatformUser};

use crate::error::MiddlewareError;

/// A step in the persist pipeline.
///
/// Middlewares run in registration order; each receives the previous one's
/// output. A failure aborts the remaining steps and the cache writes.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn apply(
        &self,
        platform: &dyn Platform,
        user: PlatformUser,
    ) -> Result<PlatformUser, MiddlewareError>;
}

/// Type alias for a shareable middleware.
pub type DynMiddleware = Arc<dyn Middleware>;

/// Adapts a synchronous closure into a [`Middleware`].
pub struct FnMiddleware<F> {
    f: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&dyn Platform, PlatformUser) -> Result<PlatformUser, MiddlewareError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&dyn Platform, PlatformUser) -> Result<PlatformUser, MiddlewareError> + Send + Sync,
{
    async fn apply(
        &self,
        platform: &dyn Platform,
        user: PlatformUser,
    ) -> Result<PlatformUser, MiddlewareError> {
        (self.f)(platform, user)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware").finish_non_exhaustive()
    }
}
