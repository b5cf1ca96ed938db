use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use super::MIGRATION_001_INITIAL;

/// A stored value together with the time it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Opaque key/value blob store backed by SQLite.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Fetch the value stored under `key`.
    pub async fn get_blob(&self, key: &str) -> Result<Option<StoredBlob>> {
        let row = sqlx::query(
            r#"
            SELECT key, value, updated_at
            FROM kv_store
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch blob")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_blob(&row)?)),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub async fn put_blob(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to store blob")?;
        Ok(())
    }

    /// Delete the value under `key`. Returns true if a value was removed.
    pub async fn delete_blob(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .context("Failed to delete blob")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_blob(row: &sqlx::sqlite::SqliteRow) -> Result<StoredBlob> {
        let updated_at_str: String = row.get("updated_at");

        Ok(StoredBlob {
            key: row.get("key"),
            value: row.get("value"),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
