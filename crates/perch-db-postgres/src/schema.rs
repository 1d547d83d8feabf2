//! Schema management for the PostgreSQL store.
//!
//! Each platform gets its own `internal_user_cache__<platform>` table,
//! created on first use.

use std::sync::Arc;

use dashmap::DashSet;
use perch_core::{table_name, validate_platform_name};
use sqlx_postgres::PgPool;
use tracing::{debug, info, instrument};

use crate::error::{PostgresError, Result};

/// Creates platform tables and remembers which ones are known to exist.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: PgPool,
    /// Tables verified to exist, so `ensure_table` is a map lookup after the first call.
    created_tables: Arc<DashSet<String>>,
}

impl SchemaManager {
    /// Creates a new `SchemaManager` with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            created_tables: Arc::new(DashSet::new()),
        }
    }

    /// Returns the validated table name for a platform.
    pub fn table_for(platform: &str) -> Result<String> {
        validate_platform_name(platform).map_err(PostgresError::schema)?;
        Ok(table_name(platform))
    }

    /// DDL for a platform's cache table.
    pub(crate) fn create_table_sql(table: &str) -> String {
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                display_name TEXT NOT NULL,
                avatar TEXT NOT NULL,
                bot BOOLEAN NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                last_updated TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        )
    }

    /// Ensures the cache table exists for the given platform.
    ///
    /// Idempotent; repeated calls for the same platform hit the in-memory set.
    #[instrument(skip(self))]
    pub async fn ensure_table(&self, platform: &str) -> Result<()> {
        let table = Self::table_for(platform)?;

        if self.created_tables.contains(&table) {
            debug!(table = %table, "table found in cache");
            return Ok(());
        }

        sqlx_core::query::query(&Self::create_table_sql(&table))
            .execute(&self.pool)
            .await?;

        info!(table = %table, "Ensured user cache table");
        self.created_tables.insert(table);
        Ok(())
    }

    /// Drops a table from the known-to-exist set so the next
    /// `ensure_table` issues the DDL again.
    pub fn forget(&self, table: &str) {
        if self.created_tables.remove(table).is_some() {
            debug!(table = %table, "forgot cached table");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_for() {
        assert_eq!(
            SchemaManager::table_for("discord").unwrap(),
            "internal_user_cache__discord"
        );
        assert!(SchemaManager::table_for("discord\"; DROP TABLE x; --").is_err());
    }

    #[test]
    fn test_create_table_sql() {
        let sql = SchemaManager::create_table_sql("internal_user_cache__discord");
        assert!(sql.contains(r#"CREATE TABLE IF NOT EXISTS "internal_user_cache__discord""#));
        assert!(sql.contains("id TEXT PRIMARY KEY"));
        assert!(sql.contains("last_updated TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
    }
}
