//! In-process [`KeyValueStore`] backed by a `BTreeMap`.

use super::{KeyValueStore, StoredValue, WriteBatch, WriteOp};
use crate::errors::Result;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Volatile key-value store. Used by tests and as a scratch store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-written: every
    // batch is staged on a clone first.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StoredValue>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn entries(&self) -> Result<Vec<(String, StoredValue)>> {
        Ok(self
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut guard = self.lock();
        let mut staged = guard.clone();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { key, value } => {
                    trace!(key = %key, kind = value.kind(), "memory put");
                    staged.insert(key, value);
                }
                WriteOp::Remove { key } => {
                    trace!(key = %key, "memory remove");
                    staged.remove(&key);
                }
            }
        }
        *guard = staged;
        Ok(())
    }
}
