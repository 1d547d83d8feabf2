//! PostgreSQL implementation of the UserStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use perch_core::{PlatformUser, UserRecord};
use perch_storage::{StorageError, UserStore};

use crate::config::PostgresConfig;
use crate::error::{is_undefined_table, sqlx_to_storage};
use crate::schema::SchemaManager;

type RecordRow = (
    String,
    String,
    String,
    String,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Converts chrono DateTime to time OffsetDateTime.
fn chrono_to_time(dt: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(dt.timestamp()).unwrap_or(OffsetDateTime::UNIX_EPOCH)
        + time::Duration::nanoseconds(i64::from(dt.timestamp_subsec_nanos()))
}

fn row_to_record(row: RecordRow) -> UserRecord {
    let (id, username, display_name, avatar, bot, created_at, last_updated) = row;
    UserRecord {
        id,
        username,
        display_name,
        avatar,
        bot,
        created_at: chrono_to_time(created_at),
        last_updated: chrono_to_time(last_updated),
    }
}

fn count_sql(table: &str) -> String {
    format!(r#"SELECT COUNT(*) FROM "{table}" WHERE id = $1"#)
}

fn select_sql(table: &str) -> String {
    format!(
        r#"SELECT id, username, display_name, avatar, bot, created_at, last_updated
           FROM "{table}" WHERE id = $1"#
    )
}

fn upsert_sql(table: &str) -> String {
    format!(
        r#"INSERT INTO "{table}" (id, username, display_name, avatar, bot)
           VALUES ($1, $2, $3, $4, $5)
           ON CONFLICT (id) DO UPDATE SET
               username = EXCLUDED.username,
               display_name = EXCLUDED.display_name,
               avatar = EXCLUDED.avatar,
               bot = EXCLUDED.bot,
               last_updated = NOW()"#
    )
}

fn delete_sql(table: &str) -> String {
    format!(r#"DELETE FROM "{table}" WHERE id = $1"#)
}

/// PostgreSQL-backed persistent user cache.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
    schema: SchemaManager,
}

impl PostgresUserStore {
    /// Opens a connection pool and wraps it in a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the database
    /// cannot be reached.
    #[instrument(skip(config), fields(url = %config.redacted_url()))]
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        info!(max_connections = config.max_connections, "connecting to postgres");
        let pool = config
            .pool_options()?
            .connect(&config.url)
            .await
            .map_err(sqlx_to_storage)?;
        debug!("postgres pool ready");
        Ok(Self::from_pool(pool))
    }

    /// Creates a store from an existing connection pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        let schema = SchemaManager::new(pool.clone());
        Self { pool, schema }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn table(platform: &str) -> Result<String, StorageError> {
        Ok(SchemaManager::table_for(platform)?)
    }

    async fn write_row(&self, table: &str, user: &PlatformUser) -> Result<(), sqlx_core::error::Error> {
        query(&upsert_sql(table))
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.display_name)
            .bind(&user.avatar)
            .bind(user.bot)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Maps a driver error, forgetting the table if the server says it is gone.
    fn map_err(&self, table: &str, err: sqlx_core::error::Error) -> StorageError {
        if is_undefined_table(&err) {
            warn!(table = %table, "user cache table is missing");
            self.schema.forget(table);
        }
        sqlx_to_storage(err)
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn ensure_table(&self, platform: &str) -> Result<(), StorageError> {
        Ok(self.schema.ensure_table(platform).await?)
    }

    #[instrument(skip(self))]
    async fn exists(&self, platform: &str, id: &str) -> Result<bool, StorageError> {
        let table = Self::table(platform)?;
        let count: i64 = query_scalar(&count_sql(&table))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.map_err(&table, e))?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn find(&self, platform: &str, id: &str) -> Result<Option<UserRecord>, StorageError> {
        let table = Self::table(platform)?;
        let row: Option<RecordRow> = query_as(&select_sql(&table))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.map_err(&table, e))?;
        Ok(row.map(row_to_record))
    }

    /// Writes the row, recreating the table once if it was dropped.
    #[instrument(skip(self, user), fields(id = %user.id))]
    async fn upsert(&self, platform: &str, user: &PlatformUser) -> Result<(), StorageError> {
        let table = Self::table(platform)?;
        match self.write_row(&table, user).await {
            Err(e) if is_undefined_table(&e) => {
                warn!(table = %table, "user cache table is missing, recreating");
                self.schema.forget(&table);
                self.schema.ensure_table(platform).await?;
                self.write_row(&table, user)
                    .await
                    .map_err(|e| self.map_err(&table, e))
            }
            other => other.map_err(|e| self.map_err(&table, e)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, platform: &str, id: &str) -> Result<bool, StorageError> {
        let table = Self::table(platform)?;
        let result = query(&delete_sql(&table))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_err(&table, e))?;
        Ok(result.rows_affected() > 0)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_sql_updates_last_updated() {
        let sql = upsert_sql("internal_user_cache__discord");
        assert!(sql.contains(r#"INSERT INTO "internal_user_cache__discord""#));
        assert!(sql.contains("ON CONFLICT (id) DO UPDATE"));
        assert!(sql.contains("last_updated = NOW()"));
        assert!(!sql.contains("created_at ="));
    }

    #[test]
    fn test_select_and_delete_sql() {
        assert!(select_sql("t").contains(r#"FROM "t" WHERE id = $1"#));
        assert_eq!(delete_sql("t"), r#"DELETE FROM "t" WHERE id = $1"#);
        assert_eq!(count_sql("t"), r#"SELECT COUNT(*) FROM "t" WHERE id = $1"#);
    }

    #[test]
    fn test_chrono_to_time() {
        let dt = DateTime::<Utc>::from_timestamp(1_700_000_000, 250).unwrap();
        let converted = chrono_to_time(dt);
        assert_eq!(converted.unix_timestamp(), 1_700_000_000);
        assert_eq!(converted.nanosecond(), 250);
    }

    #[test]
    fn test_invalid_platform_rejected_before_query() {
        let err = PostgresUserStore::table("not valid").unwrap_err();
        assert!(matches!(err, StorageError::InvalidPlatform { .. }));
    }
}
