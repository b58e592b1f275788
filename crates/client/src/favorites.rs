//! Favorites ledger.
//!
//! The favorites list is one blob under [`StoreKey::Favorites`]. Every
//! mutation reads the blob, changes it and writes it back; a process-wide
//! lock keeps two mutations from interleaving. The count is always derived
//! from the stored list.

use std::sync::Arc;

use souk_core::{FavoriteItem, Favorites, Product, ProductId};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::clock::Clock;
use crate::error::Result;
use crate::store::{KeyValueStore, Repository, StoreKey};

/// Locally stored favorites.
pub struct FavoritesLedger<S> {
    repo: Repository<S>,
    clock: Arc<dyn Clock>,
    write_lock: Arc<Mutex<()>>,
}

impl<S: Clone> Clone for FavoritesLedger<S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            clock: Arc::clone(&self.clock),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> FavoritesLedger<S> {
    #[must_use]
    pub fn new(repo: Repository<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The stored list, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read.
    pub async fn list(&self) -> Result<Favorites> {
        Ok(self.repo.get_or_default(StoreKey::Favorites).await?)
    }

    /// Add a snapshot of `product`. Does nothing if it is already a favorite.
    ///
    /// Returns whether the list changed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read or written.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: &Product) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut favorites = self.list().await?;

        let item = FavoriteItem::snapshot(product, self.clock.now().timestamp_millis());
        if !favorites.add(item) {
            debug!("Already a favorite");
            return Ok(false);
        }

        self.repo.set(StoreKey::Favorites, &favorites).await?;
        debug!(count = favorites.len(), "Favorite added");
        Ok(true)
    }

    /// Remove `id` from the list. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read or written.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut favorites = self.list().await?;

        if !favorites.remove(id) {
            return Ok(false);
        }

        self.repo.set(StoreKey::Favorites, &favorites).await?;
        debug!(count = favorites.len(), "Favorite removed");
        Ok(true)
    }

    /// Add `product` if absent, remove it if present.
    ///
    /// Returns the new liked state.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read or written.
    pub async fn toggle(&self, product: &Product) -> Result<bool> {
        if self.contains(&product.id).await? {
            self.remove(&product.id).await?;
            Ok(false)
        } else {
            self.add(product).await?;
            Ok(true)
        }
    }

    /// Whether `id` is a favorite.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read.
    pub async fn contains(&self, id: &ProductId) -> Result<bool> {
        Ok(self.list().await?.contains(id))
    }

    /// Number of favorites.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read.
    pub async fn count(&self) -> Result<usize> {
        Ok(self.list().await?.len())
    }

    /// Remove every favorite. Returns how many there were.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let count = self.list().await?.len();
        self.repo.remove(StoreKey::Favorites).await?;
        Ok(count)
    }

    /// Set `is_liked` on every product from the stored list.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read.
    pub async fn apply_liked(&self, products: &mut [Product]) -> Result<()> {
        self.list().await?.apply_liked(products);
        Ok(())
    }
}
