//! Nearby shops.
//!
//! Shops are fetched around the device position (or the fallback
//! coordinate), annotated with their distance and sorted nearest first.
//! Distances are never persisted: they are recomputed from the current
//! position whenever a list is applied, cached or not.

use std::sync::RwLock;

use souk_core::{Coordinates, Shop, filter_shops, sort_by_distance};
use tracing::{debug, instrument};

use crate::api::{MarketplaceApi, NearbyQuery};
use crate::error::ClientError;
use crate::loader::{CacheLoader, LoadOutcome, LoadTarget, Origin};
use crate::location::{LocationProvider, Locator};
use crate::scope::ViewScope;
use crate::store::{KeyValueStore, StoreKey};
use crate::sync;

struct ShopsState {
    shops: Vec<Shop>,
    origin: Origin,
    position: Coordinates,
    loading: bool,
}

struct ShopsView {
    state: RwLock<ShopsState>,
}

impl LoadTarget<Vec<Shop>> for ShopsView {
    fn origin(&self) -> Origin {
        sync::read(&self.state).origin
    }

    fn replace(&self, mut shops: Vec<Shop>, origin: Origin) {
        let mut state = sync::write(&self.state);
        for shop in &mut shops {
            shop.update_distance(&state.position);
        }
        sort_by_distance(&mut shops);
        state.shops = shops;
        state.origin = origin;
    }

    fn set_loading(&self, loading: bool) {
        sync::write(&self.state).loading = loading;
    }
}

/// Shops near the user.
pub struct NearbyShops<A, L, S> {
    api: A,
    locator: Locator<L>,
    loader: CacheLoader<S>,
    radius_km: f64,
    view: ShopsView,
}

impl<A, L, S> NearbyShops<A, L, S>
where
    A: MarketplaceApi,
    L: LocationProvider,
    S: KeyValueStore,
{
    #[must_use]
    pub fn new(api: A, locator: Locator<L>, loader: CacheLoader<S>, radius_km: f64) -> Self {
        let position = locator.fallback();
        Self {
            api,
            locator,
            loader,
            radius_km,
            view: ShopsView {
                state: RwLock::new(ShopsState {
                    shops: Vec::new(),
                    origin: Origin::Empty,
                    position,
                    loading: false,
                }),
            },
        }
    }

    /// Resolve the position and load shops around it.
    #[instrument(skip(self, scope))]
    pub async fn refresh(&self, scope: &ViewScope) -> LoadOutcome {
        let position = self.locator.position().await;
        sync::write(&self.view.state).position = position;

        let query = NearbyQuery {
            origin: position,
            radius_km: self.radius_km,
        };
        let fetch = async { self.api.nearby_shops(&query).await.map_err(ClientError::from) };

        let outcome = self
            .loader
            .load(StoreKey::AllShopsCache, scope, &self.view, fetch)
            .await;
        debug!(?outcome, shops = self.len(), "Nearby shops loaded");
        outcome
    }

    /// Shops currently shown, nearest first.
    #[must_use]
    pub fn shops(&self) -> Vec<Shop> {
        sync::read(&self.view.state).shops.clone()
    }

    /// Shown shops whose name or city contains `query`, ignoring case.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<Shop> {
        let state = sync::read(&self.view.state);
        filter_shops(&state.shops, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The position distances are measured from.
    #[must_use]
    pub fn position(&self) -> Coordinates {
        sync::read(&self.view.state).position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        sync::read(&self.view.state).shops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        sync::read(&self.view.state).shops.is_empty()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        sync::read(&self.view.state).loading
    }
}
