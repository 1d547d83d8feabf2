//! Discord API payloads.

use serde::{Deserialize, Serialize};

/// User object as returned by `GET /users/{id}` and carried in guild members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    /// Avatar hash; `a_` prefix marks an animated avatar
    #[serde(default)]
    pub avatar: Option<String>,
    /// `"0"` for users on the unique-username system
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl DiscordUser {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            global_name: None,
            avatar: None,
            discriminator: None,
            bot: false,
        }
    }
}

/// Membership of a user in a guild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMember {
    pub user: DiscordUser,
    #[serde(default)]
    pub nick: Option<String>,
}

impl GuildMember {
    pub fn new(user: DiscordUser) -> Self {
        Self { user, nick: None }
    }

    #[must_use]
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }
}
