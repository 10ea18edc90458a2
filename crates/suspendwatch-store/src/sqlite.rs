//! SQLite-backed store.

use crate::{StateStore, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use suspendwatch_types::{ResourceReference, StateEntry};
use tracing::{debug, info, instrument};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS resource_state (
    key TEXT PRIMARY KEY NOT NULL,
    entry TEXT NOT NULL
)";

#[derive(Debug, Clone, Copy, Default)]
pub enum SynchronousMode {
    Off,
    Normal,
    #[default]
    Full,
    Extra,
}

#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to SQLite database file
    pub database_path: PathBuf,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection acquire timeout
    pub acquire_timeout: Duration,
    /// Enable WAL mode
    pub wal_mode: bool,
    /// Synchronous mode setting
    pub synchronous: SynchronousMode,
    /// Busy timeout for locked database
    pub busy_timeout: Duration,
    /// Create database if not exists
    pub create_if_missing: bool,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("suspendwatch.db"),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(30),
            wal_mode: true,
            synchronous: SynchronousMode::Full,
            busy_timeout: Duration::from_secs(5),
            create_if_missing: true,
        }
    }
}

impl SqliteStoreConfig {
    /// Defaults for a database at `path`.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            database_path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig(
                "database path cannot be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(StoreError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(self.create_if_missing)
            .busy_timeout(self.busy_timeout);

        let options = if self.wal_mode {
            options.journal_mode(SqliteJournalMode::Wal)
        } else {
            options
        };

        match self.synchronous {
            SynchronousMode::Off => options.synchronous(SqliteSynchronous::Off),
            SynchronousMode::Normal => options.synchronous(SqliteSynchronous::Normal),
            SynchronousMode::Full => options.synchronous(SqliteSynchronous::Full),
            SynchronousMode::Extra => options.synchronous(SqliteSynchronous::Extra),
        }
    }
}

/// Store persisting one JSON-encoded [`StateEntry`] per resource key.
pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    /// Open (creating if needed) the database and ensure the schema exists.
    #[instrument(skip(config), fields(path = %config.database_path.display()))]
    pub async fn open(config: SqliteStoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        info!("state store opened");
        Ok(Self { pool })
    }

    /// Number of stored entries.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resource_state")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the pool gracefully.
    pub async fn close(&self) {
        info!("closing state store");
        self.pool.close().await;
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn get(&self, resource: &ResourceReference) -> Result<StateEntry, StoreError> {
        let key = resource.store_key();

        let row: Option<String> =
            sqlx::query_scalar("SELECT entry FROM resource_state WHERE key = ?")
                .bind(&key)
                .fetch_optional(&self.pool)
                .await?;

        let Some(raw) = row else {
            return Err(StoreError::NotFound { key });
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Serialization { key, source })
    }

    async fn put(&self, entry: &StateEntry) -> Result<(), StoreError> {
        let key = entry.resource.store_key();
        let raw = serde_json::to_string(entry).map_err(|source| StoreError::Serialization {
            key: key.clone(),
            source,
        })?;

        sqlx::query(
            "INSERT INTO resource_state (key, entry) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET entry = excluded.entry",
        )
        .bind(&key)
        .bind(raw)
        .execute(&self.pool)
        .await?;

        debug!(%key, suspended = entry.suspended, "state entry saved");
        Ok(())
    }
}
