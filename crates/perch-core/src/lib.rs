//! Core types for perch.
//!
//! - [`PlatformUser`]: the resolved identity record that flows through every tier
//! - [`UserRecord`]: the persistent-tier projection of a user
//! - [`Platform`]: the capability set each external identity platform implements
//! - [`naming`]: fast-cache key and persistent table naming shared by all backends

pub mod naming;
pub mod platform;
pub mod tier;
pub mod user;

pub use naming::{fast_cache_key, table_name, validate_platform_name};
pub use platform::{DynPlatform, Platform, PlatformError, PlatformResult};
pub use tier::CacheTier;
pub use user::{ExtraData, PlatformStatus, PlatformUser, UserRecord};
