//! Search session.
//!
//! A session runs remote searches with the user's filters and sort order,
//! pages through results, records executed queries in the history ledger and
//! serves autocomplete. Filters and sort order persist across sessions.

use std::sync::Mutex;

use souk_core::{
    Autocomplete, Favorites, Product, SearchFacets, SearchFilters, SearchPreferences, SortBy,
    filter_products,
};
use tracing::{debug, instrument, warn};

use crate::api::{MarketplaceApi, SearchPage, SearchRequest};
use crate::error::{ClientError, Result};
use crate::favorites::FavoritesLedger;
use crate::history::SearchHistoryLedger;
use crate::loader::{self, LoadOutcome, LoadTarget, Origin};
use crate::pagination::{PageResult, PageTicket, Paginator};
use crate::scope::ViewScope;
use crate::store::{KeyValueStore, Repository, StoreKey};
use crate::sync;

struct SearchState {
    query: String,
    preferences: SearchPreferences,
    paginator: Paginator<Product>,
    facets: SearchFacets,
    total: u64,
    origin: Origin,
    liked: Favorites,
}

impl SearchState {
    fn apply_page(&mut self, ticket: PageTicket, page: SearchPage) -> Option<usize> {
        let SearchPage {
            mut products,
            total,
            total_pages,
            facets,
            ..
        } = page;
        self.liked.apply_liked(&mut products);
        let appended = self.paginator.complete(ticket, products, total_pages)?;
        self.total = total;
        self.facets = facets;
        self.origin = Origin::Network;
        Some(appended)
    }
}

struct SearchView {
    state: Mutex<SearchState>,
}

/// The page-1 request of one submitted search.
struct FirstPage<'a> {
    view: &'a SearchView,
    ticket: PageTicket,
}

impl LoadTarget<SearchPage> for FirstPage<'_> {
    fn origin(&self) -> Origin {
        sync::lock(&self.view.state).origin
    }

    fn replace(&self, page: SearchPage, _origin: Origin) {
        if sync::lock(&self.view.state)
            .apply_page(self.ticket, page)
            .is_none()
        {
            debug!("Search superseded, dropping results");
        }
    }
}

/// A remote search session.
pub struct SearchSession<A, S> {
    api: A,
    repo: Repository<S>,
    history: SearchHistoryLedger<S>,
    favorites: FavoritesLedger<S>,
    page_size: u32,
    view: SearchView,
}

impl<A: MarketplaceApi, S: KeyValueStore> SearchSession<A, S> {
    /// Start a session, restoring the last-used filters and sort order.
    pub async fn start(
        api: A,
        repo: Repository<S>,
        history: SearchHistoryLedger<S>,
        favorites: FavoritesLedger<S>,
        page_size: u32,
    ) -> Self {
        let preferences = match repo.get_or_default(StoreKey::SearchPreferences).await {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!(error = %e, "Failed to read search preferences, using defaults");
                SearchPreferences::default()
            }
        };

        Self {
            api,
            repo,
            history,
            favorites,
            page_size,
            view: SearchView {
                state: Mutex::new(SearchState {
                    query: String::new(),
                    preferences,
                    paginator: Paginator::new(page_size),
                    facets: SearchFacets::default(),
                    total: 0,
                    origin: Origin::Empty,
                    liked: Favorites::new(),
                }),
            },
        }
    }

    /// Run a new search for `query` and record it in the history.
    ///
    /// A blank query clears the results without a request.
    #[instrument(skip(self, scope))]
    pub async fn submit(&self, query: &str, scope: &ViewScope) -> LoadOutcome {
        let query = query.trim();
        if query.is_empty() {
            self.clear();
            return LoadOutcome::Empty;
        }

        if let Err(e) = self.history.record(query).await {
            warn!(error = %e, "Failed to record search history");
        }
        sync::lock(&self.view.state).query = query.to_string();
        self.rerun(scope).await
    }

    /// Change the sort order, persist it and re-run the current search.
    pub async fn set_sort(&self, sort_by: SortBy, scope: &ViewScope) -> LoadOutcome {
        self.update_preferences(|p| p.sort_by = sort_by).await;
        self.rerun(scope).await
    }

    /// Replace the filters, persist them and re-run the current search.
    pub async fn set_filters(&self, filters: SearchFilters, scope: &ViewScope) -> LoadOutcome {
        self.update_preferences(|p| p.filters = filters).await;
        self.rerun(scope).await
    }

    /// Fetch and append the next page of results.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the request fails. Results are left
    /// unchanged and the next call retries the same page.
    #[instrument(skip(self, scope))]
    pub async fn load_more(&self, scope: &ViewScope) -> Result<PageResult> {
        let (ticket, request) = {
            let mut state = sync::lock(&self.view.state);
            if state.query.is_empty() {
                return Ok(PageResult::Exhausted);
            }
            match state.paginator.begin() {
                Some(ticket) => (ticket, self.request(&state, ticket.page())),
                None if state.paginator.is_loading() => return Ok(PageResult::Busy),
                None => return Ok(PageResult::Exhausted),
            }
        };

        let result = self.api.search(&request).await;

        let mut state = sync::lock(&self.view.state);
        if !scope.is_active() {
            state.paginator.fail(ticket);
            return Ok(PageResult::Cancelled);
        }
        match result {
            Ok(page) => Ok(state
                .apply_page(ticket, page)
                .map_or(PageResult::Cancelled, PageResult::Appended)),
            Err(e) => {
                warn!(page = ticket.page(), error = %e, "Failed to load more results");
                state.paginator.fail(ticket);
                Err(e.into())
            }
        }
    }

    /// Suggestions for a partial query. A blank query returns nothing
    /// without a request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the request fails.
    pub async fn suggest(&self, partial: &str) -> Result<Autocomplete> {
        let partial = partial.trim();
        if partial.is_empty() {
            return Ok(Autocomplete::default());
        }
        Ok(self.api.autocomplete(partial).await?)
    }

    /// Shown results matching `needle` in title, description, category or
    /// seller name.
    #[must_use]
    pub fn filter_local(&self, needle: &str) -> Vec<Product> {
        let state = sync::lock(&self.view.state);
        filter_products(state.paginator.items(), needle)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Recent queries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be read.
    pub async fn history(&self) -> Result<Vec<String>> {
        self.history.list().await
    }

    #[must_use]
    pub fn results(&self) -> Vec<Product> {
        sync::lock(&self.view.state).paginator.items().to_vec()
    }

    #[must_use]
    pub fn facets(&self) -> SearchFacets {
        sync::lock(&self.view.state).facets.clone()
    }

    /// Total matches reported by the server.
    #[must_use]
    pub fn total(&self) -> u64 {
        sync::lock(&self.view.state).total
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        let state = sync::lock(&self.view.state);
        !state.query.is_empty() && state.paginator.has_more()
    }

    #[must_use]
    pub fn query(&self) -> String {
        sync::lock(&self.view.state).query.clone()
    }

    #[must_use]
    pub fn preferences(&self) -> SearchPreferences {
        sync::lock(&self.view.state).preferences.clone()
    }

    /// Forget the current query and results. Preferences are kept.
    pub fn clear(&self) {
        let mut state = sync::lock(&self.view.state);
        state.query.clear();
        state.paginator.reset();
        state.facets = SearchFacets::default();
        state.total = 0;
        state.origin = Origin::Empty;
    }

    /// Re-run page 1 of the current query with the current preferences.
    async fn rerun(&self, scope: &ViewScope) -> LoadOutcome {
        let liked = match self.favorites.list().await {
            Ok(liked) => liked,
            Err(e) => {
                warn!(error = %e, "Failed to read favorites, showing none as liked");
                Favorites::new()
            }
        };

        let (ticket, request) = {
            let mut state = sync::lock(&self.view.state);
            if state.query.is_empty() {
                return LoadOutcome::Empty;
            }
            state.liked = liked;
            state.origin = Origin::Empty;
            state.total = 0;
            state.facets = SearchFacets::default();
            state.paginator.reset();
            let ticket = state.paginator.restart();
            (ticket, self.request(&state, 1))
        };
        let target = FirstPage {
            view: &self.view,
            ticket,
        };

        let fetch = async { self.api.search(&request).await.map_err(ClientError::from) };
        let outcome = loader::fetch_into(scope, &target, fetch).await;
        if outcome != LoadOutcome::Fresh {
            sync::lock(&self.view.state).paginator.fail(ticket);
        }
        debug!(?outcome, query = %request.query, "Search finished");
        outcome
    }

    fn request(&self, state: &SearchState, page: u32) -> SearchRequest {
        SearchRequest {
            query: state.query.clone(),
            page,
            limit: self.page_size,
            sort_by: state.preferences.sort_by,
            filters: state.preferences.filters.clone(),
        }
    }

    async fn update_preferences<F>(&self, change: F)
    where
        F: FnOnce(&mut SearchPreferences) + Send,
    {
        let preferences = {
            let mut state = sync::lock(&self.view.state);
            change(&mut state.preferences);
            state.preferences.clone()
        };
        if let Err(e) = self.repo.set(StoreKey::SearchPreferences, &preferences).await {
            warn!(error = %e, "Failed to persist search preferences");
        }
    }
}
