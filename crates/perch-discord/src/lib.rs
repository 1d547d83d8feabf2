//! Discord platform adapter for perch.
//!
//! - identities are snowflakes (decimal `u64`, 17 to 20 digits)
//! - live state is the [`GatewayCache`] the bot's gateway connection keeps
//!   current; the probe checks the preferred guild first
//! - remote fetch is `GET /users/{id}` with the bot token
//! - avatars are resolved to CDN URLs

pub mod avatar;
pub mod client;
pub mod config;
pub mod gateway;
pub mod model;
pub mod platform;

pub use avatar::avatar_url;
pub use client::DiscordClient;
pub use config::DiscordConfig;
pub use gateway::GatewayCache;
pub use model::{DiscordUser, GuildMember};
pub use platform::{DiscordPlatform, PLATFORM_NAME, validate_snowflake};
