use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use suspendwatch_store::{InMemoryStateStore, StateStore, StoreError};
use suspendwatch_types::{ResourceReference, StateEntry};

/// In-memory store counting its reads and writes.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryStateStore,
    gets: AtomicUsize,
    puts: AtomicUsize,
    fail_writes: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing entries without counting them.
    pub fn with_entries(entries: impl IntoIterator<Item = StateEntry>) -> Self {
        Self {
            inner: InMemoryStateStore::with_entries(entries),
            ..Self::default()
        }
    }

    /// Make every `put` fail as a closed database would. Reads still work.
    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryStateStore {
        &self.inner
    }
}

#[async_trait]
impl StateStore for CountingStore {
    async fn get(&self, resource: &ResourceReference) -> Result<StateEntry, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(resource).await
    }

    async fn put(&self, entry: &StateEntry) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        self.inner.put(entry).await
    }
}
