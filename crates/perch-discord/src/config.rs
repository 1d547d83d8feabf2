//! Discord adapter configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token, sent as `Authorization: Bot <token>`
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,

    /// Guild searched first by the live-state probe
    #[serde(default)]
    pub preferred_guild: Option<String>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_api_base(),
            cdn_base: default_cdn_base(),
            preferred_guild: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &if self.token.is_empty() { "" } else { "****" })
            .field("api_base", &self.api_base)
            .field("cdn_base", &self.cdn_base)
            .field("preferred_guild", &self.preferred_guild)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl DiscordConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_cdn_base(mut self, cdn_base: impl Into<String>) -> Self {
        self.cdn_base = cdn_base.into();
        self
    }

    #[must_use]
    pub fn with_preferred_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.preferred_guild = Some(guild_id.into());
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_cdn_base() -> String {
    "https://cdn.discordapp.com".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}
