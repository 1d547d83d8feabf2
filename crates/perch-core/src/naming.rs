//! Naming shared by every storage backend.
//!
//! Both tiers are namespaced by the platform name, so a platform name ends up
//! spliced into SQL identifiers. [`validate_platform_name`] is the gate for that.

/// Prefix of every fast-cache key.
pub const FAST_CACHE_KEY_PREFIX: &str = "uobj__";

/// Prefix of every persistent cache table.
pub const TABLE_PREFIX: &str = "internal_user_cache__";

const MAX_PLATFORM_NAME_LEN: usize = 32;

/// Fast-cache key for an identity: `uobj__<platform>:<id>`.
pub fn fast_cache_key(platform: &str, id: &str) -> String {
    format!("{FAST_CACHE_KEY_PREFIX}{platform}:{id}")
}

/// Persistent table for a platform: `internal_user_cache__<platform>`.
pub fn table_name(platform: &str) -> String {
    format!("{TABLE_PREFIX}{platform}")
}

/// Checks that a platform name is a safe lowercase SQL identifier fragment.
pub fn validate_platform_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("platform name must not be empty".into());
    }
    if name.len() > MAX_PLATFORM_NAME_LEN {
        return Err(format!(
            "platform name '{name}' exceeds {MAX_PLATFORM_NAME_LEN} characters"
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    {
        return Err(format!(
            "platform name '{name}' may only contain [a-z0-9_]"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_cache_key() {
        assert_eq!(
            fast_cache_key("discord", "123456789012345678"),
            "uobj__discord:123456789012345678"
        );
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("discord"), "internal_user_cache__discord");
    }

    #[test]
    fn test_validate_platform_name() {
        assert!(validate_platform_name("discord").is_ok());
        assert!(validate_platform_name("matrix_v2").is_ok());
        assert!(validate_platform_name("").is_err());
        assert!(validate_platform_name("Discord").is_err());
        assert!(validate_platform_name("x; DROP TABLE users").is_err());
        assert!(validate_platform_name(&"a".repeat(33)).is_err());
    }
}
