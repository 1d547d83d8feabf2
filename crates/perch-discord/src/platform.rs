//! [`Platform`] implementation for Discord.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use perch_core::{Platform, PlatformError, PlatformResult, PlatformStatus, PlatformUser};
use serde_json::Value;
use tracing::{debug, info};

use crate::avatar::avatar_url;
use crate::client::DiscordClient;
use crate::config::DiscordConfig;
use crate::gateway::GatewayCache;
use crate::model::{DiscordUser, GuildMember};

pub const PLATFORM_NAME: &str = "discord";

/// Checks that `raw` is a plausible snowflake.
pub fn validate_snowflake(raw: &str) -> PlatformResult<String> {
    let id = raw.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlatformError::invalid_identity(raw, "snowflakes contain only digits"));
    }
    if id.parse::<u64>().is_err() {
        return Err(PlatformError::invalid_identity(raw, "not an unsigned 64-bit integer"));
    }
    if !(17..=20).contains(&id.len()) {
        return Err(PlatformError::invalid_identity(raw, "snowflakes are 17 to 20 digits"));
    }
    Ok(id.to_string())
}

pub struct DiscordPlatform {
    config: DiscordConfig,
    gateway: Arc<GatewayCache>,
    client: OnceLock<DiscordClient>,
    initialized: AtomicBool,
}

impl DiscordPlatform {
    pub fn new(config: DiscordConfig) -> Self {
        Self::with_gateway(config, Arc::new(GatewayCache::new()))
    }

    /// Creates an adapter reading live state from a shared gateway cache.
    pub fn with_gateway(config: DiscordConfig, gateway: Arc<GatewayCache>) -> Self {
        Self {
            config,
            gateway,
            client: OnceLock::new(),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn gateway(&self) -> &Arc<GatewayCache> {
        &self.gateway
    }

    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    fn client(&self) -> PlatformResult<&DiscordClient> {
        self.client
            .get()
            .ok_or_else(|| PlatformError::Config("discord adapter is not initialized".into()))
    }

    fn to_user(&self, user: DiscordUser) -> PlatformUser {
        let avatar = avatar_url(&self.config.cdn_base, &user);
        PlatformUser::new(user.id, user.username)
            .with_display_name(user.global_name.unwrap_or_default())
            .with_avatar(avatar)
            .with_bot(user.bot)
    }

    fn member_user(&self, guild_id: &str, member: GuildMember, preferred: bool) -> PlatformUser {
        let status = self
            .gateway
            .presence(guild_id, &member.user.id)
            .unwrap_or(PlatformStatus::Offline);

        self.to_user(member.user)
            .with_status(status)
            .with_extra("nickname", member.nick.unwrap_or_default())
            .with_extra("mutual_guild", guild_id)
            .with_extra("preferred_guild", Value::Bool(preferred))
    }
}

#[async_trait]
impl Platform for DiscordPlatform {
    fn name(&self) -> &str {
        PLATFORM_NAME
    }

    fn validate_identity(&self, raw: &str) -> PlatformResult<String> {
        validate_snowflake(raw)
    }

    async fn initialize(&self) -> PlatformResult<()> {
        if self.is_initialized() {
            return Ok(());
        }
        if self.config.token.trim().is_empty() {
            return Err(PlatformError::Config("discord bot token is not configured".into()));
        }

        let client = DiscordClient::new(&self.config)?;
        // A concurrent initialize may have won; either client is equivalent
        let _ = self.client.set(client);
        self.initialized.store(true, Ordering::Release);

        info!(
            api_base = %self.config.api_base,
            preferred_guild = ?self.config.preferred_guild,
            "discord adapter initialized"
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    async fn live_state_probe(&self, id: &str) -> PlatformResult<Option<PlatformUser>> {
        let preferred = self.config.preferred_guild.as_deref();

        if let Some(guild_id) = preferred
            && let Some(member) = self.gateway.member(guild_id, id)
        {
            debug!(guild = %guild_id, "member found in preferred guild");
            return Ok(Some(self.member_user(guild_id, member, true)));
        }

        for guild_id in self.gateway.guild_ids() {
            if Some(guild_id.as_str()) == preferred {
                continue;
            }
            if let Some(member) = self.gateway.member(&guild_id, id) {
                debug!(guild = %guild_id, "member found in mutual guild");
                return Ok(Some(self.member_user(&guild_id, member, false)));
            }
        }

        Ok(None)
    }

    async fn remote_fetch(&self, id: &str) -> PlatformResult<PlatformUser> {
        let user = self.client()?.fetch_user(id).await?;
        Ok(self.to_user(user))
    }
}
