use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Platform-specific key/value data attached to a user.
///
/// Only carried by the live-state and fast-cache tiers; the persistent tier
/// drops it.
pub type ExtraData = BTreeMap<String, serde_json::Value>;

/// Presence of a user on their platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlatformStatus {
    Online,
    Idle,
    #[serde(rename = "dnd")]
    DoNotDisturb,
    #[default]
    Offline,
}

impl PlatformStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::DoNotDisturb => "dnd",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for PlatformStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user resolved from an external identity platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlatformUser {
    /// Platform-native identity, unique per platform
    pub id: String,
    pub username: String,
    /// Falls back to `username` when the platform has none
    #[serde(default)]
    pub display_name: String,
    /// Resolved avatar URL (never a raw hash)
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub status: PlatformStatus,
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub extra_data: ExtraData,
}

impl PlatformUser {
    /// Creates a user with the given identity and username.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    #[must_use]
    pub fn with_bot(mut self, bot: bool) -> Self {
        self.bot = bot;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: PlatformStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra_data.insert(key.into(), value.into());
        self
    }

    /// Fills `display_name` from `username` when it is empty.
    pub fn ensure_display_name(&mut self) {
        if self.display_name.trim().is_empty() {
            self.display_name = self.username.clone();
        }
    }
}

/// Row of a platform's persistent cache table.
///
/// Same fields as [`PlatformUser`] minus `status`, `flags` and `extra_data`,
/// plus bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
    pub bot: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl UserRecord {
    /// Builds a fresh record from a user, stamping both timestamps with `now`.
    pub fn from_user(user: &PlatformUser, now: OffsetDateTime) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar: user.avatar.clone(),
            bot: user.bot,
            created_at: now,
            last_updated: now,
        }
    }

    /// Time elapsed since the row was last written, clamped at zero.
    pub fn age(&self, now: OffsetDateTime) -> Duration {
        let elapsed = now - self.last_updated;
        Duration::try_from(elapsed).unwrap_or(Duration::ZERO)
    }

    /// A row is stale once its age reaches the expiry window.
    pub fn is_stale(&self, expiry: Duration, now: OffsetDateTime) -> bool {
        self.age(now) >= expiry
    }

    /// Converts the row back into a user.
    ///
    /// The persistent tier holds no presence, so the status is offline.
    pub fn into_user(self) -> PlatformUser {
        let mut user = PlatformUser {
            id: self.id,
            username: self.username,
            display_name: self.display_name,
            avatar: self.avatar,
            bot: self.bot,
            status: PlatformStatus::Offline,
            flags: BTreeSet::new(),
            extra_data: ExtraData::new(),
        };
        user.ensure_display_name();
        user
    }
}
