//! Search history ledger, stored under [`StoreKey::SearchHistory`].

use std::sync::Arc;

use souk_core::SearchHistory;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::store::{KeyValueStore, Repository, StoreKey};

/// Recent search queries, most recent first, capped at ten.
pub struct SearchHistoryLedger<S> {
    repo: Repository<S>,
    write_lock: Arc<Mutex<()>>,
}

impl<S: Clone> Clone for SearchHistoryLedger<S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> SearchHistoryLedger<S> {
    #[must_use]
    pub fn new(repo: Repository<S>) -> Self {
        Self {
            repo,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Stored queries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read.
    pub async fn list(&self) -> Result<Vec<String>> {
        let history: SearchHistory = self.repo.get_or_default(StoreKey::SearchHistory).await?;
        Ok(history.entries().to_vec())
    }

    /// Record an executed query. Blank queries are ignored.
    ///
    /// Returns whether the stored list changed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read or written.
    pub async fn record(&self, query: &str) -> Result<bool> {
        self.update(|history| history.record(query)).await
    }

    /// Remove one query, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read or written.
    pub async fn remove(&self, query: &str) -> Result<bool> {
        self.update(|history| history.remove(query)).await
    }

    /// Forget every query.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the delete fails.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.repo.remove(StoreKey::SearchHistory).await?;
        debug!("Search history cleared");
        Ok(())
    }

    async fn update<F>(&self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut SearchHistory) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut history: SearchHistory = self.repo.get_or_default(StoreKey::SearchHistory).await?;
        if !change(&mut history) {
            return Ok(false);
        }
        self.repo.set(StoreKey::SearchHistory, &history).await?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ledger() -> SearchHistoryLedger<MemoryStore> {
        SearchHistoryLedger::new(Repository::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_eleven_queries_keep_ten_most_recent() {
        let history = ledger();
        for i in 1..=11 {
            history.record(&format!("query {i}")).await.unwrap();
        }

        let entries = history.list().await.unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0], "query 11");
        assert!(!entries.contains(&"query 1".to_string()));
    }

    #[tokio::test]
    async fn test_reinsert_moves_to_front() {
        let history = ledger();
        history.record("lamp").await.unwrap();
        history.record("chair").await.unwrap();
        history.record("lamp").await.unwrap();

        assert_eq!(history.list().await.unwrap(), ["lamp", "chair"]);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let history = ledger();
        history.record("lamp").await.unwrap();
        history.record("chair").await.unwrap();

        assert!(history.remove("LAMP").await.unwrap());
        assert!(!history.remove("lamp").await.unwrap());
        assert_eq!(history.list().await.unwrap(), ["chair"]);

        history.clear().await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
    }
}
