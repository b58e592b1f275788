//! Product detail screen.

use souk_core::ProductId;
use tracing::{debug, instrument};

use crate::api::{MarketplaceApi, ProductDetail};
use crate::error::Result;
use crate::favorites::FavoritesLedger;
use crate::loader::{self, LoadOutcome, LoadState, LoadTarget};
use crate::scope::ViewScope;
use crate::store::KeyValueStore;

/// Detail view for one product at a time.
///
/// Details are not written to the device store; the API client keeps a
/// short-lived in-memory copy instead.
pub struct ProductDetails<A, S> {
    api: A,
    favorites: FavoritesLedger<S>,
    state: LoadState<ProductDetail>,
}

impl<A: MarketplaceApi, S: KeyValueStore> ProductDetails<A, S> {
    #[must_use]
    pub fn new(api: A, favorites: FavoritesLedger<S>) -> Self {
        Self {
            api,
            favorites,
            state: LoadState::new(),
        }
    }

    /// Fetch a product with its seller, shop and related listings.
    ///
    /// `is_liked` is set from the favorites ledger on every embedded product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the request fails, or
    /// `ClientError::Store` if the favorites ledger cannot be read.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch(&self, id: &ProductId) -> Result<ProductDetail> {
        let mut detail = self.api.product_detail(id).await?;
        let favorites = self.favorites.list().await?;
        for product in detail.products_mut() {
            product.is_liked = favorites.contains(&product.id);
        }
        debug!(
            similar = detail.similar.len(),
            same_seller = detail.same_seller.len(),
            "Fetched product detail"
        );
        Ok(detail)
    }

    /// Load `id` into the view, replacing whatever product was shown.
    pub async fn open(&self, id: &ProductId, scope: &ViewScope) -> LoadOutcome {
        if self
            .state
            .data()
            .is_some_and(|shown| &shown.product.id != id)
        {
            self.state.clear();
        }
        loader::fetch_into(scope, &self.state, self.fetch(id)).await
    }

    /// The detail currently shown.
    #[must_use]
    pub fn detail(&self) -> Option<ProductDetail> {
        self.state.data()
    }

    /// Toggle the shown product's favorite state. Returns the new state, or
    /// `None` when nothing is shown.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the favorites ledger cannot be updated.
    pub async fn toggle_favorite(&self) -> Result<Option<bool>> {
        let Some(mut detail) = self.state.data() else {
            return Ok(None);
        };
        let liked = self.favorites.toggle(&detail.product).await?;

        let id = detail.product.id.clone();
        for product in detail.products_mut().filter(|p| p.id == id) {
            product.is_liked = liked;
        }
        self.state.replace(detail, self.state.origin());
        Ok(Some(liked))
    }
}
