//! In-process view of the guilds the bot is connected to.
//!
//! The gateway connection owns the writes (member add/update/remove,
//! presence updates); the adapter only reads.

use std::collections::HashMap;

use dashmap::DashMap;
use perch_core::PlatformStatus;

use crate::model::GuildMember;

#[derive(Debug, Default, Clone)]
struct GuildState {
    members: HashMap<String, GuildMember>,
    presences: HashMap<String, PlatformStatus>,
}

/// Guild membership and presence, keyed by guild ID then user ID.
#[derive(Debug, Default)]
pub struct GatewayCache {
    guilds: DashMap<String, GuildState>,
}

impl GatewayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a guild with no cached members.
    pub fn add_guild(&self, guild_id: impl Into<String>) {
        self.guilds.entry(guild_id.into()).or_default();
    }

    pub fn remove_guild(&self, guild_id: &str) -> bool {
        self.guilds.remove(guild_id).is_some()
    }

    /// Guild IDs in ascending order.
    pub fn guild_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.guilds.iter().map(|g| g.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn upsert_member(&self, guild_id: &str, member: GuildMember) {
        self.guilds
            .entry(guild_id.to_string())
            .or_default()
            .members
            .insert(member.user.id.clone(), member);
    }

    /// Drops a member and their presence from a guild.
    pub fn remove_member(&self, guild_id: &str, user_id: &str) -> bool {
        match self.guilds.get_mut(guild_id) {
            Some(mut guild) => {
                guild.presences.remove(user_id);
                guild.members.remove(user_id).is_some()
            }
            None => false,
        }
    }

    pub fn set_presence(&self, guild_id: &str, user_id: &str, status: PlatformStatus) {
        self.guilds
            .entry(guild_id.to_string())
            .or_default()
            .presences
            .insert(user_id.to_string(), status);
    }

    pub fn member(&self, guild_id: &str, user_id: &str) -> Option<GuildMember> {
        self.guilds
            .get(guild_id)
            .and_then(|g| g.members.get(user_id).cloned())
    }

    pub fn presence(&self, guild_id: &str, user_id: &str) -> Option<PlatformStatus> {
        self.guilds
            .get(guild_id)
            .and_then(|g| g.presences.get(user_id).copied())
    }

    pub fn member_count(&self, guild_id: &str) -> usize {
        self.guilds.get(guild_id).map_or(0, |g| g.members.len())
    }
}
