//! Tiered read-through cache for platform users
//!
//! Resolves a platform identity by querying, in strict priority order:
//! - the platform adapter's live connection state
//! - the fast cache (`uobj__<platform>:<id>`, TTL-bound)
//! - the persistent store (`internal_user_cache__<platform>`), refreshing
//!   stale rows in the background
//! - the platform's remote API
//!
//! Every resolution that reaches past the fast cache is pushed back through
//! the middleware pipeline into both tiers.

pub mod config;
pub mod error;
pub mod invalidation;
pub mod middleware;
pub mod resolver;

pub use config::ResolverConfig;
pub use error::{MiddlewareError, ResolveError, ResolveResult};
pub use invalidation::ClearOutcome;
pub use middleware::{DynMiddleware, FnMiddleware, Middleware};
pub use resolver::{ResolutionSource, Resolved, UserResolver, UserResolverBuilder};
