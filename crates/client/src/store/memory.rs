//! In-process store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError, StoreKey};

/// A [`KeyValueStore`] that lives only as long as the process.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<StoreKey, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently set.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set_raw(&self, key: StoreKey, value: String) -> Result<(), StoreError> {
        self.entries.write().await.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(&key).is_some())
    }
}
