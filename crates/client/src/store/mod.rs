//! Local device store.
//!
//! Small JSON blobs under a fixed key schema. Every key is a [`StoreKey`]
//! variant; there are no free-form keys.
//!
//! # Backends
//!
//! - [`SqliteStore`] - persistent, one row per key in `kv_store`
//! - [`MemoryStore`] - process-local, for tests and throwaway sessions
//!
//! [`Repository`] layers typed access over either backend. Writes replace the
//! whole blob, so the last write wins and there are no multi-key transactions.

mod memory;
mod sqlite;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Blob could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Embedded migrations failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// The fixed set of keys the client persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The favorites ledger.
    Favorites,
    /// Recent search queries.
    SearchHistory,
    /// Cache envelope for the discovery feed.
    DiscoverFeedCache,
    /// Cache envelope for the nearby shops list.
    AllShopsCache,
    /// Cache envelope for the promoted products strip.
    PromoProductsCache,
    /// Last-used search filters and sort order.
    SearchPreferences,
    /// The last push token successfully registered.
    PushRegistration,
}

impl StoreKey {
    /// Every key, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Favorites,
        Self::SearchHistory,
        Self::DiscoverFeedCache,
        Self::AllShopsCache,
        Self::PromoProductsCache,
        Self::SearchPreferences,
        Self::PushRegistration,
    ];

    /// Key as stored on disk.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::SearchHistory => "search_history",
            Self::DiscoverFeedCache => "discover_feed_cache",
            Self::AllShopsCache => "all_shops_cache",
            Self::PromoProductsCache => "promo_products_cache",
            Self::SearchPreferences => "search_preferences",
            Self::PushRegistration => "push_registration",
        }
    }

    /// Whether the key holds a disposable cache envelope.
    #[must_use]
    pub const fn is_cache(self) -> bool {
        matches!(
            self,
            Self::DiscoverFeedCache | Self::AllShopsCache | Self::PromoProductsCache
        )
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw string storage keyed by [`StoreKey`].
pub trait KeyValueStore: Send + Sync {
    /// Read the blob under `key`, if any.
    fn get_raw(&self, key: StoreKey)
    -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Replace the blob under `key`.
    fn set_raw(
        &self,
        key: StoreKey,
        value: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete the blob under `key`. Returns whether anything was removed.
    fn remove(&self, key: StoreKey) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// Typed JSON access over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Repository<S> {
    store: S,
}

impl<S: KeyValueStore> Repository<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Read and decode the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the read fails, or
    /// `StoreError::Serialization` if the blob does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.store.get_raw(key).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Read the value under `key`, treating a missing or undecodable blob as
    /// `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the read itself fails.
    pub async fn get_or_default<T>(&self, key: StoreKey) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        match self.get(key).await {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(StoreError::Serialization(e)) => {
                warn!(key = %key, error = %e, "Discarding corrupt stored value");
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Encode and store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if `value` cannot be encoded, or
    /// `StoreError::Database` if the write fails.
    pub async fn set<T: Serialize + Sync>(&self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        debug!(key = %key, bytes = raw.len(), "Writing stored value");
        self.store.set_raw(key, raw).await
    }

    /// Remove the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the delete fails.
    pub async fn remove(&self, key: StoreKey) -> Result<bool, StoreError> {
        self.store.remove(key).await
    }

    /// Drop every cache envelope, leaving ledgers and preferences intact.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if a delete fails.
    pub async fn clear_caches(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for key in StoreKey::ALL.into_iter().filter(|k| k.is_cache()) {
            if self.store.remove(key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use souk_core::SearchHistory;

    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let names: HashSet<_> = StoreKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), StoreKey::ALL.len());
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let repo = Repository::new(MemoryStore::new());
        let mut history = SearchHistory::new();
        history.record("lamp");

        repo.set(StoreKey::SearchHistory, &history).await.unwrap();
        let back: Option<SearchHistory> = repo.get(StoreKey::SearchHistory).await.unwrap();
        assert_eq!(back, Some(history));
    }

    #[tokio::test]
    async fn test_corrupt_value_reads_as_default() {
        let store = MemoryStore::new();
        store
            .set_raw(StoreKey::SearchHistory, "{not json".to_string())
            .await
            .unwrap();
        let repo = Repository::new(store);

        assert!(matches!(
            repo.get::<SearchHistory>(StoreKey::SearchHistory).await,
            Err(StoreError::Serialization(_))
        ));
        let history: SearchHistory = repo.get_or_default(StoreKey::SearchHistory).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_clear_caches_keeps_ledgers() {
        let repo = Repository::new(MemoryStore::new());
        repo.set(StoreKey::DiscoverFeedCache, &1).await.unwrap();
        repo.set(StoreKey::AllShopsCache, &2).await.unwrap();
        repo.set(StoreKey::Favorites, &3).await.unwrap();

        assert_eq!(repo.clear_caches().await.unwrap(), 2);
        assert!(repo.get::<i32>(StoreKey::DiscoverFeedCache).await.unwrap().is_none());
        assert_eq!(repo.get::<i32>(StoreKey::Favorites).await.unwrap(), Some(3));
    }
}
