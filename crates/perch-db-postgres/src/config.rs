//! Settings for the persistent user cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx_core::pool::PoolOptions;
use sqlx_postgres::Postgres;

use crate::error::{PostgresError, Result};

fn default_url() -> String {
    "postgres://localhost/perch".into()
}

fn default_max_connections() -> u32 {
    8
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

/// Where the `internal_user_cache__*` tables live and how many
/// connections perch may hold against that database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a lookup waits for a free connection before failing.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// The URL with any password replaced, for log fields.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        match rest.rsplit_once('@') {
            Some((credentials, host)) if credentials.contains(':') => {
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{scheme}://{user}:****@{host}")
            }
            _ => self.url.clone(),
        }
    }

    /// Pool options for this configuration. No idle connections are kept.
    pub(crate) fn pool_options(&self) -> Result<PoolOptions<Postgres>> {
        if self.max_connections == 0 {
            return Err(PostgresError::config("max_connections must be > 0"));
        }
        Ok(PoolOptions::<Postgres>::new()
            .max_connections(self.max_connections)
            .min_connections(0)
            .acquire_timeout(self.acquire_timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PostgresConfig =
            serde_json::from_str(r#"{"url": "postgres://db/perch"}"#).expect("deserialize");
        assert_eq!(config.url, "postgres://db/perch");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_redacted_url() {
        let redacted = |url: &str| PostgresConfig::new(url).redacted_url();

        assert_eq!(
            redacted("postgres://perch:hunter2@db:5432/perch"),
            "postgres://perch:****@db:5432/perch"
        );
        assert_eq!(redacted("postgres://perch@db/perch"), "postgres://perch@db/perch");
        assert_eq!(redacted("postgres://db/perch"), "postgres://db/perch");
        assert_eq!(redacted("not a url"), "not a url");
    }

    #[test]
    fn test_zero_connections_rejected() {
        let config = PostgresConfig::default().with_max_connections(0);
        let err = config.pool_options().unwrap_err();
        assert!(matches!(err, PostgresError::Config { .. }));

        assert!(PostgresConfig::default().pool_options().is_ok());
    }
}
