use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A durable cache tier that can be targeted by invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    /// The relational `internal_user_cache__<platform>` table
    Persistent,
    /// The TTL-bound key-value store
    FastCache,
}

impl CacheTier {
    pub const ALL: [CacheTier; 2] = [CacheTier::Persistent, CacheTier::FastCache];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::FastCache => "fast_cache",
        }
    }
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "persistent" | "pg" | "iuc" => Ok(Self::Persistent),
            "fast_cache" | "fast-cache" | "redis" => Ok(Self::FastCache),
            other => Err(format!("unknown cache tier: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("redis".parse::<CacheTier>().unwrap(), CacheTier::FastCache);
        assert_eq!("fast-cache".parse::<CacheTier>().unwrap(), CacheTier::FastCache);
        assert_eq!("iuc".parse::<CacheTier>().unwrap(), CacheTier::Persistent);
        assert!("disk".parse::<CacheTier>().is_err());
    }
}
