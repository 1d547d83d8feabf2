use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use perch_core::{PlatformUser, UserRecord, table_name, validate_platform_name};
use perch_storage::{StorageError, UserStore};
use time::OffsetDateTime;

type TableKey = (String, String); // (platform, id)

/// In-memory persistent-tier stand-in.
///
/// Mirrors the relational backend's behavior, including failing on tables
/// that were never created.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    tables: Arc<DashSet<String>>,
    rows: Arc<DashMap<TableKey, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a record verbatim, creating the platform's table if needed.
    ///
    /// Used to seed rows with chosen timestamps.
    pub fn insert_record(&self, platform: &str, record: UserRecord) {
        self.tables.insert(platform.to_string());
        self.rows
            .insert((platform.to_string(), record.id.clone()), record);
    }

    /// Reads a record without going through the async trait.
    pub fn record(&self, platform: &str, id: &str) -> Option<UserRecord> {
        self.rows
            .get(&(platform.to_string(), id.to_string()))
            .map(|r| r.clone())
    }

    /// Number of rows held for a platform.
    pub fn count(&self, platform: &str) -> usize {
        self.rows.iter().filter(|r| r.key().0 == platform).count()
    }

    pub fn has_table(&self, platform: &str) -> bool {
        self.tables.contains(platform)
    }

    fn check_table(&self, platform: &str) -> Result<(), StorageError> {
        if self.tables.contains(platform) {
            Ok(())
        } else {
            Err(StorageError::query(format!(
                "relation \"{}\" does not exist",
                table_name(platform)
            )))
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn ensure_table(&self, platform: &str) -> Result<(), StorageError> {
        validate_platform_name(platform).map_err(StorageError::invalid_platform)?;
        self.tables.insert(platform.to_string());
        Ok(())
    }

    async fn exists(&self, platform: &str, id: &str) -> Result<bool, StorageError> {
        self.check_table(platform)?;
        Ok(self
            .rows
            .contains_key(&(platform.to_string(), id.to_string())))
    }

    async fn find(&self, platform: &str, id: &str) -> Result<Option<UserRecord>, StorageError> {
        self.check_table(platform)?;
        Ok(self.record(platform, id))
    }

    async fn upsert(&self, platform: &str, user: &PlatformUser) -> Result<(), StorageError> {
        self.check_table(platform)?;
        let now = OffsetDateTime::now_utc();
        self.rows
            .entry((platform.to_string(), user.id.clone()))
            .and_modify(|row| {
                row.username = user.username.clone();
                row.display_name = user.display_name.clone();
                row.avatar = user.avatar.clone();
                row.bot = user.bot;
                row.last_updated = now;
            })
            .or_insert_with(|| UserRecord::from_user(user, now));
        Ok(())
    }

    async fn delete(&self, platform: &str, id: &str) -> Result<bool, StorageError> {
        self.check_table(platform)?;
        Ok(self
            .rows
            .remove(&(platform.to_string(), id.to_string()))
            .is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_table() {
        let store = InMemoryUserStore::new();
        let err = store.find("discord", "1").await.unwrap_err();
        assert!(err.to_string().contains("internal_user_cache__discord"));

        store.ensure_table("discord").await.unwrap();
        assert!(store.find("discord", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_unsafe_platform_name() {
        let store = InMemoryUserStore::new();
        let err = store.ensure_table("Discord;--").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPlatform { .. }));
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let store = InMemoryUserStore::new();
        let old = OffsetDateTime::now_utc() - time::Duration::days(2);
        let mut record = UserRecord::from_user(&PlatformUser::new("1", "ada"), old);
        record.display_name = "ada".into();
        store.insert_record("discord", record);

        let user = PlatformUser::new("1", "ada_l").with_display_name("Ada");
        store.upsert("discord", &user).await.unwrap();

        let row = store.record("discord", "1").unwrap();
        assert_eq!(row.username, "ada_l");
        assert_eq!(row.display_name, "Ada");
        assert_eq!(row.created_at, old);
        assert!(row.last_updated > old);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryUserStore::new();
        store.ensure_table("discord").await.unwrap();
        store
            .upsert("discord", &PlatformUser::new("1", "ada"))
            .await
            .unwrap();

        assert!(store.exists("discord", "1").await.unwrap());
        assert!(store.delete("discord", "1").await.unwrap());
        assert!(!store.delete("discord", "1").await.unwrap());
        assert_eq!(store.count("discord"), 0);
    }
}
