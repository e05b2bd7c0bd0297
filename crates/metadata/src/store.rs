//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::FragmentRow;
use crate::repos::FragmentRepo;
use async_trait::async_trait;
use fragments_core::{FragmentId, FragmentRecord, OwnerId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::instrument;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: FragmentRepo + Send + Sync {
    /// Run schema migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check store connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;

    /// Name of the backend ("memory", "sqlite"), used for logging.
    fn backend_name(&self) -> &'static str;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection serializes writers and avoids "database is locked".
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::debug!(path = %path.display(), "opened sqlite metadata store");
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

/// Creation time as integer nanoseconds so rows sort chronologically.
fn created_key(record: &FragmentRecord) -> i64 {
    i64::try_from(record.created.unix_timestamp_nanos()).unwrap_or(i64::MAX)
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[async_trait]
impl FragmentRepo for SqliteStore {
    #[instrument(skip(self, record), fields(backend = "sqlite", owner_id = %record.owner_id, id = %record.id))]
    async fn put_metadata(&self, record: &FragmentRecord) -> MetadataResult<()> {
        let row = FragmentRow::from_record(record)?;
        sqlx::query(
            "INSERT INTO fragments (owner_id, fragment_id, record, created_nanos) VALUES (?, ?, ?, ?)
             ON CONFLICT(owner_id, fragment_id) DO UPDATE SET record = excluded.record",
        )
        .bind(&row.owner_id)
        .bind(&row.fragment_id)
        .bind(&row.record)
        .bind(created_key(record))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "sqlite"))]
    async fn get_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> MetadataResult<Option<FragmentRecord>> {
        let row = sqlx::query_as::<_, FragmentRow>(
            "SELECT owner_id, fragment_id, record FROM fragments WHERE owner_id = ? AND fragment_id = ?",
        )
        .bind(owner_id.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(FragmentRow::into_record).transpose()
    }

    #[instrument(skip(self), fields(backend = "sqlite"))]
    async fn query_metadata(&self, owner_id: &OwnerId) -> MetadataResult<Vec<FragmentRecord>> {
        let rows = sqlx::query_as::<_, FragmentRow>(
            "SELECT owner_id, fragment_id, record FROM fragments WHERE owner_id = ?
             ORDER BY created_nanos, fragment_id",
        )
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(FragmentRow::into_record).collect()
    }

    #[instrument(skip(self), fields(backend = "sqlite"))]
    async fn delete_metadata(&self, owner_id: &OwnerId, id: &FragmentId) -> MetadataResult<()> {
        let result = sqlx::query("DELETE FROM fragments WHERE owner_id = ? AND fragment_id = ?")
            .bind(owner_id.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("{owner_id}/{id}")));
        }
        Ok(())
    }
}

/// SQL schema for SQLite.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS fragments (
    owner_id TEXT NOT NULL,
    fragment_id TEXT NOT NULL,
    record TEXT NOT NULL,
    created_nanos INTEGER NOT NULL,
    PRIMARY KEY (owner_id, fragment_id)
);
CREATE INDEX IF NOT EXISTS idx_fragments_owner_created ON fragments(owner_id, created_nanos);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn record(owner: &str, id: &str) -> FragmentRecord {
        let now = OffsetDateTime::now_utc();
        FragmentRecord {
            id: FragmentId::parse(id).unwrap(),
            owner_id: OwnerId::parse(owner).unwrap(),
            media_type: "text/plain".to_string(),
            size: 0,
            created: now,
            updated: now,
        }
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("meta.db")).await.unwrap();
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/meta.db");
        let saved = record("abc", "f1");
        {
            let store = SqliteStore::new(&path).await.unwrap();
            store.put_metadata(&saved).await.unwrap();
            store.pool().close().await;
        }

        let store = SqliteStore::new(&path).await.unwrap();
        let loaded = store
            .get_metadata(&saved.owner_id, &saved.id)
            .await
            .unwrap();
        assert_eq!(loaded, Some(saved));
    }

    #[tokio::test]
    async fn test_upsert_keeps_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("meta.db")).await.unwrap();

        let first = record("abc", "b-first");
        let second = record("abc", "a-second");
        store.put_metadata(&first).await.unwrap();
        store.put_metadata(&second).await.unwrap();

        let mut updated = first.clone();
        updated.size = 42;
        store.put_metadata(&updated).await.unwrap();

        let ids: Vec<_> = store
            .query_metadata(&first.owner_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.id.to_string(), r.size))
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&("b-first".to_string(), 42)));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("meta.db")).await.unwrap();
        sqlx::query(
            "INSERT INTO fragments (owner_id, fragment_id, record, created_nanos) VALUES ('abc', 'f1', 'not json', 0)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let owner = OwnerId::parse("abc").unwrap();
        let id = FragmentId::parse("f1").unwrap();
        assert!(matches!(
            store.get_metadata(&owner, &id).await,
            Err(MetadataError::Serialization(_))
        ));
    }
}
