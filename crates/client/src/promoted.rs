//! Promoted products strip.
//!
//! The strip shows the promoted, boosted or featured items from the first
//! page of the product listing.

use souk_core::Product;
use tracing::{instrument, warn};

use crate::api::{MarketplaceApi, ProductQuery};
use crate::error::Result;
use crate::favorites::FavoritesLedger;
use crate::loader::{CacheLoader, LoadOutcome, LoadState};
use crate::scope::ViewScope;
use crate::store::{KeyValueStore, StoreKey};

/// The promoted products strip on the home screen.
pub struct PromotedProducts<A, S> {
    api: A,
    loader: CacheLoader<S>,
    favorites: FavoritesLedger<S>,
    limit: u32,
    state: LoadState<Vec<Product>>,
}

impl<A: MarketplaceApi, S: KeyValueStore> PromotedProducts<A, S> {
    #[must_use]
    pub fn new(api: A, loader: CacheLoader<S>, favorites: FavoritesLedger<S>, limit: u32) -> Self {
        Self {
            api,
            loader,
            favorites,
            limit,
            state: LoadState::new(),
        }
    }

    /// Load the strip, cache first.
    #[instrument(skip(self, scope))]
    pub async fn refresh(&self, scope: &ViewScope) -> LoadOutcome {
        self.loader
            .load(StoreKey::PromoProductsCache, scope, &self.state, self.fetch())
            .await
    }

    /// Highlighted products currently shown, with liked flags from the
    /// favorites ledger.
    pub async fn items(&self) -> Vec<Product> {
        let mut products = self.state.data().unwrap_or_default();
        if let Err(e) = self.favorites.apply_liked(&mut products).await {
            warn!(error = %e, "Failed to read favorites for promoted strip");
        }
        products
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    async fn fetch(&self) -> Result<Vec<Product>> {
        let query = ProductQuery {
            page: 1,
            limit: self.limit,
            category: None,
        };
        let page = self.api.list_products(&query).await?;
        Ok(page
            .products
            .into_iter()
            .filter(Product::is_highlighted)
            .collect())
    }
}
