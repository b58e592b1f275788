//! `SQLite`-backed store.
//!
//! # Table: `kv_store`
//!
//! One row per [`StoreKey`], holding the JSON blob and the time it was last
//! written. Migrations live in `crates/client/migrations/` and are embedded
//! at compile time.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, instrument};

use super::{KeyValueStore, StoreError, StoreKey};

/// A [`KeyValueStore`] over a `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and apply migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the URL is invalid or the database
    /// cannot be opened, or `StoreError::Migration` if migrations fail.
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database, gone when the store is dropped.
    ///
    /// # Errors
    ///
    /// Same as [`SqliteStore::connect`].
    pub async fn in_memory() -> Result<Self, StoreError> {
        // Each connection to :memory: is its own database, so keep exactly one alive.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Local store ready");
        Ok(Self { pool })
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl KeyValueStore for SqliteStore {
    async fn get_raw(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set_raw(&self, key: StoreKey, value: String) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
