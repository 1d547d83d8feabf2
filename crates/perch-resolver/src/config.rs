//! Resolver configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the user resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Fast-cache TTL and persistent-row staleness window, in seconds
    #[serde(default = "default_user_expiry_secs")]
    pub user_expiry_secs: u64,

    /// Collapse concurrent background refreshes of the same identity
    #[serde(default = "default_dedupe_refreshes")]
    pub dedupe_refreshes: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_expiry_secs: default_user_expiry_secs(),
            dedupe_refreshes: default_dedupe_refreshes(),
        }
    }
}

impl ResolverConfig {
    pub fn user_expiry(&self) -> Duration {
        Duration::from_secs(self.user_expiry_secs)
    }

    /// Sets the expiry window, rounding partial seconds up.
    #[must_use]
    pub fn with_user_expiry(mut self, expiry: Duration) -> Self {
        let partial = u64::from(expiry.subsec_nanos() > 0);
        self.user_expiry_secs = expiry.as_secs().saturating_add(partial);
        self
    }

    #[must_use]
    pub fn with_dedupe_refreshes(mut self, dedupe: bool) -> Self {
        self.dedupe_refreshes = dedupe;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.user_expiry_secs == 0 {
            return Err("cache.user_expiry_secs must be > 0".into());
        }
        Ok(())
    }
}

fn default_user_expiry_secs() -> u64 {
    8 * 60 * 60
}

fn default_dedupe_refreshes() -> bool {
    true
}
