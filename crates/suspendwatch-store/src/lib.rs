//! State persistence.
//!
//! A [`StateStore`] remembers, per resource, the last suspension state the
//! watcher observed. Implementations must be safe for concurrent single-key
//! reads and writes; the watcher itself never writes one key concurrently.

mod memory;
mod sqlite;

pub use memory::InMemoryStateStore;
pub use sqlite::{SqliteStateStore, SqliteStoreConfig, SynchronousMode};

use async_trait::async_trait;
use suspendwatch_types::{ResourceReference, StateEntry};
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no state recorded for {key}")]
    NotFound { key: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to (de)serialize entry for {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Whether this is the "no entry" condition rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Durable mapping from resource to last-known state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the entry for a resource, failing with [`StoreError::NotFound`]
    /// when none exists.
    async fn get(&self, resource: &ResourceReference) -> Result<StateEntry, StoreError>;

    /// Create or replace the entry keyed by `entry.resource`.
    async fn put(&self, entry: &StateEntry) -> Result<(), StoreError>;
}
