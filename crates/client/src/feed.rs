//! Discovery feed.
//!
//! The feed shows the product listing page by page. The uncategorized feed
//! goes through the cache loader so a recent first page renders instantly;
//! a category-filtered feed always comes from the network. Changing the
//! category resets pagination.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use souk_core::{Favorites, Product, ProductId};
use tracing::{debug, instrument, warn};

use crate::api::{MarketplaceApi, ProductQuery};
use crate::error::Result;
use crate::favorites::FavoritesLedger;
use crate::loader::{self, CacheLoader, LoadOutcome, LoadTarget, Origin};
use crate::pagination::{PageResult, PageTicket, Paginator};
use crate::scope::ViewScope;
use crate::store::{KeyValueStore, StoreKey};
use crate::sync;

/// Cached first page of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub products: Vec<Product>,
    pub total_pages: u32,
}

struct FeedState {
    paginator: Paginator<Product>,
    origin: Origin,
    category: Option<String>,
    liked: Favorites,
    initial_loading: bool,
}

/// The mutable half of the feed, shared with in-flight loads.
struct FeedView {
    state: Mutex<FeedState>,
}

/// One page-1 load, bound to the ticket it was started with.
struct FirstPageLoad<'a> {
    view: &'a FeedView,
    ticket: PageTicket,
}

impl LoadTarget<FeedSnapshot> for FirstPageLoad<'_> {
    fn origin(&self) -> Origin {
        sync::lock(&self.view.state).origin
    }

    fn replace(&self, payload: FeedSnapshot, origin: Origin) {
        let mut state = sync::lock(&self.view.state);
        let FeedSnapshot {
            mut products,
            total_pages,
        } = payload;
        state.liked.apply_liked(&mut products);

        let applied = match origin {
            Origin::Cache => state.paginator.preview(self.ticket, products, total_pages),
            Origin::Network => state
                .paginator
                .complete(self.ticket, products, total_pages)
                .is_some(),
            Origin::Empty => false,
        };
        if applied {
            state.origin = origin;
        } else {
            debug!("Feed was reset during load, dropping page");
        }
    }

    fn set_loading(&self, loading: bool) {
        let mut state = sync::lock(&self.view.state);
        if state.paginator.is_current(self.ticket) {
            state.initial_loading = loading;
        }
    }
}

/// The product discovery feed.
pub struct DiscoverFeed<A, S> {
    api: A,
    loader: CacheLoader<S>,
    favorites: FavoritesLedger<S>,
    page_size: u32,
    view: FeedView,
}

impl<A: MarketplaceApi, S: KeyValueStore> DiscoverFeed<A, S> {
    #[must_use]
    pub fn new(
        api: A,
        loader: CacheLoader<S>,
        favorites: FavoritesLedger<S>,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            loader,
            favorites,
            page_size,
            view: FeedView {
                state: Mutex::new(FeedState {
                    paginator: Paginator::new(page_size),
                    origin: Origin::Empty,
                    category: None,
                    liked: Favorites::new(),
                    initial_loading: false,
                }),
            },
        }
    }

    /// Load page 1, showing a fresh cached copy first when there is one.
    ///
    /// Called on mount and on pull-to-refresh. Never fails; see
    /// [`LoadOutcome`].
    #[instrument(skip(self, scope))]
    pub async fn refresh(&self, scope: &ViewScope) -> LoadOutcome {
        self.reload_liked().await;

        let (ticket, category) = {
            let mut state = sync::lock(&self.view.state);
            (state.paginator.restart(), state.category.clone())
        };
        let target = FirstPageLoad {
            view: &self.view,
            ticket,
        };

        let fetch = self.fetch_snapshot(1, category.clone());
        let outcome = if category.is_none() {
            self.loader
                .load(StoreKey::DiscoverFeedCache, scope, &target, fetch)
                .await
        } else {
            loader::fetch_into(scope, &target, fetch).await
        };

        let mut state = sync::lock(&self.view.state);
        if outcome != LoadOutcome::Fresh {
            state.paginator.fail(ticket);
        }
        if state.paginator.is_current(ticket) {
            state.initial_loading = false;
        }
        debug!(?outcome, items = state.paginator.len(), "Feed refreshed");
        outcome
    }

    /// Filter the feed by category (or clear the filter) and reload.
    pub async fn set_category(&self, category: Option<String>, scope: &ViewScope) -> LoadOutcome {
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        {
            let mut state = sync::lock(&self.view.state);
            state.category = category;
            state.origin = Origin::Empty;
            state.paginator.reset();
        }
        self.refresh(scope).await
    }

    /// Fetch and append the next page.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the page request fails. The list is left
    /// unchanged and the next call retries the same page.
    #[instrument(skip(self, scope))]
    pub async fn load_more(&self, scope: &ViewScope) -> Result<PageResult> {
        let (ticket, category) = {
            let mut state = sync::lock(&self.view.state);
            match state.paginator.begin() {
                Some(ticket) => (ticket, state.category.clone()),
                None if state.paginator.is_loading() => return Ok(PageResult::Busy),
                None => return Ok(PageResult::Exhausted),
            }
        };

        let result = self.fetch_snapshot(ticket.page(), category).await;

        let mut state = sync::lock(&self.view.state);
        if !scope.is_active() {
            state.paginator.fail(ticket);
            return Ok(PageResult::Cancelled);
        }

        match result {
            Ok(FeedSnapshot {
                mut products,
                total_pages,
            }) => {
                state.liked.apply_liked(&mut products);
                let appended = state.paginator.complete(ticket, products, total_pages);
                Ok(appended.map_or(PageResult::Cancelled, PageResult::Appended))
            }
            Err(e) => {
                warn!(page = ticket.page(), error = %e, "Failed to load next page");
                state.paginator.fail(ticket);
                Err(e)
            }
        }
    }

    /// Toggle a shown product's favorite state. Returns the new state, or
    /// `None` if the product is not in the feed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the favorites ledger cannot be updated.
    pub async fn toggle_favorite(&self, id: &ProductId) -> Result<Option<bool>> {
        let product = {
            let state = sync::lock(&self.view.state);
            state.paginator.items().iter().find(|p| &p.id == id).cloned()
        };
        let Some(product) = product else {
            return Ok(None);
        };

        let liked = self.favorites.toggle(&product).await?;
        self.reload_liked().await;
        Ok(Some(liked))
    }

    /// Products currently shown.
    #[must_use]
    pub fn items(&self) -> Vec<Product> {
        sync::lock(&self.view.state).paginator.items().to_vec()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        sync::lock(&self.view.state).paginator.has_more()
    }

    /// Whether a "load more" is in flight.
    #[must_use]
    pub fn is_loading_more(&self) -> bool {
        let state = sync::lock(&self.view.state);
        state.paginator.is_loading() && !state.initial_loading
    }

    /// Whether page 1 is loading with nothing yet shown.
    #[must_use]
    pub fn is_initial_loading(&self) -> bool {
        sync::lock(&self.view.state).initial_loading
    }

    #[must_use]
    pub fn category(&self) -> Option<String> {
        sync::lock(&self.view.state).category.clone()
    }

    /// Where the shown items came from.
    #[must_use]
    pub fn origin(&self) -> Origin {
        sync::lock(&self.view.state).origin
    }

    async fn fetch_snapshot(&self, page: u32, category: Option<String>) -> Result<FeedSnapshot> {
        let query = ProductQuery {
            page,
            limit: self.page_size,
            category,
        };
        let page = self.api.list_products(&query).await?;
        Ok(FeedSnapshot {
            products: page.products,
            total_pages: page.total_pages,
        })
    }

    /// Refresh the liked set from the ledger and re-flag shown items.
    async fn reload_liked(&self) {
        let liked = match self.favorites.list().await {
            Ok(liked) => liked,
            Err(e) => {
                warn!(error = %e, "Failed to read favorites, showing none as liked");
                Favorites::new()
            }
        };
        let mut state = sync::lock(&self.view.state);
        let FeedState {
            paginator,
            liked: current,
            ..
        } = &mut *state;
        liked.apply_liked(paginator.items_mut());
        *current = liked;
    }
}
