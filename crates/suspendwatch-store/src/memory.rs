//! In-memory store.

use crate::{StateStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use suspendwatch_types::{ResourceReference, StateEntry};

/// Volatile store keyed the same way as the SQLite store.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<String, StateEntry>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing entries.
    pub fn with_entries(entries: impl IntoIterator<Item = StateEntry>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.write();
            for entry in entries {
                map.insert(entry.resource.store_key(), entry);
            }
        }
        store
    }

    /// Snapshot of every entry.
    pub fn entries(&self) -> Vec<StateEntry> {
        self.entries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, resource: &ResourceReference) -> Result<StateEntry, StoreError> {
        let key = resource.store_key();
        self.entries
            .read()
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound { key })
    }

    async fn put(&self, entry: &StateEntry) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(entry.resource.store_key(), entry.clone());
        Ok(())
    }
}
