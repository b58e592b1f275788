//! Shared client state.

use std::sync::Arc;

use tracing::info;

use crate::api::HttpApiClient;
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::detail::ProductDetails;
use crate::error::Result;
use crate::favorites::FavoritesLedger;
use crate::feed::DiscoverFeed;
use crate::history::SearchHistoryLedger;
use crate::loader::CacheLoader;
use crate::location::{LocationProvider, Locator};
use crate::notifications::{PushRegistrar, StaticToken};
use crate::promoted::PromotedProducts;
use crate::search::SearchSession;
use crate::shops::NearbyShops;
use crate::store::{Repository, SqliteStore};

/// Everything the screens share: configuration, the API client, the device
/// store and the ledgers kept in it.
///
/// This struct is cheaply cloneable via `Arc`. Screen components are built
/// from it on demand.
#[derive(Clone)]
pub struct ClientState {
    inner: Arc<ClientStateInner>,
}

struct ClientStateInner {
    config: ClientConfig,
    api: HttpApiClient,
    repo: Repository<SqliteStore>,
    clock: Arc<dyn Clock>,
    favorites: FavoritesLedger<SqliteStore>,
    history: SearchHistoryLedger<SqliteStore>,
}

impl ClientState {
    /// Open the store named in `config` and build the API client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the store cannot be opened or
    /// migrated, or `ClientError::Api` if the HTTP client cannot be built.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let store = SqliteStore::connect(&config.store_url).await?;
        let api = HttpApiClient::new(&config.api)?;
        info!(base_url = %config.api.base_url, "Client ready");
        Ok(Self::new(config, api, store, Arc::new(SystemClock)))
    }

    /// Assemble state from already-built parts.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        api: HttpApiClient,
        store: SqliteStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let repo = Repository::new(store);
        let favorites = FavoritesLedger::new(repo.clone(), Arc::clone(&clock));
        let history = SearchHistoryLedger::new(repo.clone());

        Self {
            inner: Arc::new(ClientStateInner {
                config,
                api,
                repo,
                clock,
                favorites,
                history,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &HttpApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn repo(&self) -> &Repository<SqliteStore> {
        &self.inner.repo
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoritesLedger<SqliteStore> {
        &self.inner.favorites
    }

    #[must_use]
    pub fn history(&self) -> &SearchHistoryLedger<SqliteStore> {
        &self.inner.history
    }

    /// A cache loader using the configured expiry.
    #[must_use]
    pub fn loader(&self) -> CacheLoader<SqliteStore> {
        CacheLoader::new(
            self.inner.repo.clone(),
            Arc::clone(&self.inner.clock),
            self.inner.config.cache_ttl,
        )
    }

    /// A fresh discovery feed.
    #[must_use]
    pub fn feed(&self) -> DiscoverFeed<HttpApiClient, SqliteStore> {
        DiscoverFeed::new(
            self.inner.api.clone(),
            self.loader(),
            self.inner.favorites.clone(),
            self.inner.config.page_size,
        )
    }

    /// A nearby shops list using `provider` for the device position.
    #[must_use]
    pub fn nearby_shops<L: LocationProvider>(
        &self,
        provider: L,
    ) -> NearbyShops<HttpApiClient, L, SqliteStore> {
        NearbyShops::new(
            self.inner.api.clone(),
            Locator::new(provider, self.inner.config.default_location),
            self.loader(),
            self.inner.config.nearby_radius_km,
        )
    }

    #[must_use]
    pub fn promoted(&self) -> PromotedProducts<HttpApiClient, SqliteStore> {
        PromotedProducts::new(
            self.inner.api.clone(),
            self.loader(),
            self.inner.favorites.clone(),
            self.inner.config.page_size,
        )
    }

    #[must_use]
    pub fn product_details(&self) -> ProductDetails<HttpApiClient, SqliteStore> {
        ProductDetails::new(self.inner.api.clone(), self.inner.favorites.clone())
    }

    /// A search session with the last-used preferences restored.
    pub async fn search(&self) -> SearchSession<HttpApiClient, SqliteStore> {
        SearchSession::start(
            self.inner.api.clone(),
            self.inner.repo.clone(),
            self.inner.history.clone(),
            self.inner.favorites.clone(),
            self.inner.config.page_size,
        )
        .await
    }

    /// A push registrar using the configured token.
    #[must_use]
    pub fn push_registrar(&self) -> PushRegistrar<HttpApiClient, StaticToken, SqliteStore> {
        PushRegistrar::new(
            self.inner.api.clone(),
            StaticToken(self.inner.config.push.token.clone()),
            self.inner.repo.clone(),
            Arc::clone(&self.inner.clock),
        )
    }
}
