//! Stale-while-revalidate loading.
//!
//! A load reads the cache envelope for a [`StoreKey`] and fetches from the
//! network at the same time. A fresh-enough envelope is shown immediately;
//! the network result then replaces it and is written back with a new
//! timestamp. If the network fails, whatever is on screen stays.
//!
//! The network result always wins: once a target holds network data, a
//! cache read that completes later is ignored. Ordering is decided by the
//! target's [`Origin`], not by which future finishes first.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use souk_core::CacheEnvelope;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::ClientError;
use crate::scope::ViewScope;
use crate::store::{KeyValueStore, Repository, StoreKey};
use crate::sync;

/// Where the data currently shown by a target came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// Nothing shown yet.
    #[default]
    Empty,
    /// A cache envelope that has not expired.
    Cache,
    /// A live network response.
    Network,
}

/// Result of one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The network result was applied.
    Fresh,
    /// The network failed; previously shown or cached data remains.
    Stale,
    /// The network failed and there is nothing to show.
    Empty,
    /// The view closed before the result arrived.
    Cancelled,
}

impl LoadOutcome {
    /// Whether the target has something to show.
    #[must_use]
    pub const fn has_data(self) -> bool {
        matches!(self, Self::Fresh | Self::Stale)
    }
}

/// View state a loader can fill.
pub trait LoadTarget<T>: Send + Sync {
    /// Origin of the data currently shown.
    fn origin(&self) -> Origin;

    /// Replace the shown data with `payload`.
    fn replace(&self, payload: T, origin: Origin);

    /// Toggle the initial-loading indicator.
    fn set_loading(&self, _loading: bool) {}
}

/// A snapshot of [`LoadState`].
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub data: Option<T>,
    pub origin: Origin,
    pub loading: bool,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            origin: Origin::Empty,
            loading: false,
        }
    }
}

/// Shared view state for a single loaded value.
///
/// Clones share the same state.
#[derive(Debug)]
pub struct LoadState<T> {
    inner: Arc<RwLock<Snapshot<T>>>,
}

impl<T> Clone for LoadState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot::default())),
        }
    }
}

impl<T: Clone> LoadState<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        sync::read(&self.inner).clone()
    }

    /// Copy of the current data, if any.
    #[must_use]
    pub fn data(&self) -> Option<T> {
        sync::read(&self.inner).data.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        sync::read(&self.inner).loading
    }

    /// Forget the shown data.
    pub fn clear(&self) {
        *sync::write(&self.inner) = Snapshot::default();
    }
}

impl<T: Send + Sync> LoadTarget<T> for LoadState<T> {
    fn origin(&self) -> Origin {
        sync::read(&self.inner).origin
    }

    fn replace(&self, payload: T, origin: Origin) {
        let mut state = sync::write(&self.inner);
        state.data = Some(payload);
        state.origin = origin;
    }

    fn set_loading(&self, loading: bool) {
        sync::write(&self.inner).loading = loading;
    }
}

/// Runs cache-then-network loads against one store.
pub struct CacheLoader<S> {
    repo: Repository<S>,
    clock: Arc<dyn Clock>,
    expiry: Duration,
}

impl<S: Clone> Clone for CacheLoader<S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            clock: Arc::clone(&self.clock),
            expiry: self.expiry,
        }
    }
}

impl<S: KeyValueStore> CacheLoader<S> {
    #[must_use]
    pub fn new(repo: Repository<S>, clock: Arc<dyn Clock>, expiry: Duration) -> Self {
        Self {
            repo,
            clock,
            expiry,
        }
    }

    #[must_use]
    pub const fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Read the envelope under `key`, returning its payload only while fresh.
    ///
    /// Missing, expired and undecodable envelopes all read as `None`.
    pub async fn read_cached<T: DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
        let envelope = match self.repo.get::<CacheEnvelope<T>>(key).await {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                debug!(key = %key, "No cache envelope");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cache envelope");
                return None;
            }
        };

        let now = self.clock.now();
        let age_ms = envelope.age_millis(now);
        let payload = envelope.into_fresh(now, self.expiry);
        if payload.is_none() {
            debug!(key = %key, age_ms, "Cache envelope expired");
        }
        payload
    }

    /// Overwrite the envelope under `key` with `payload`, stamped now.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the write fails.
    pub async fn write_cached<T: Serialize + Sync>(
        &self,
        key: StoreKey,
        payload: &T,
    ) -> Result<(), ClientError> {
        let envelope = CacheEnvelope::new(payload, self.clock.now());
        self.repo.set(key, &envelope).await?;
        Ok(())
    }

    /// Fill `target` from the cache under `key` and from `fetch`, concurrently.
    ///
    /// Never fails: network and store errors are logged and reflected in the
    /// returned [`LoadOutcome`].
    pub async fn load<T, G, F>(
        &self,
        key: StoreKey,
        scope: &ViewScope,
        target: &G,
        fetch: F,
    ) -> LoadOutcome
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        G: LoadTarget<T>,
        F: Future<Output = Result<T, ClientError>> + Send,
    {
        if !scope.is_active() {
            return LoadOutcome::Cancelled;
        }
        target.set_loading(true);

        let cache_arm = async {
            let Some(payload) = self.read_cached::<T>(key).await else {
                return;
            };
            if !scope.is_active() {
                return;
            }
            if target.origin() == Origin::Network {
                debug!(key = %key, "Network result already shown, ignoring cache");
                return;
            }
            debug!(key = %key, "Showing cached data");
            target.replace(payload, Origin::Cache);
            target.set_loading(false);
        };

        let network_arm = async {
            let payload = fetch.await?;
            if !scope.is_active() {
                return Ok(false);
            }
            if let Err(e) = self.write_cached(key, &payload).await {
                warn!(key = %key, error = %e, "Failed to write cache envelope");
            }
            target.replace(payload, Origin::Network);
            Ok::<_, ClientError>(true)
        };

        let ((), network) = tokio::join!(cache_arm, network_arm);

        if !scope.is_active() {
            debug!(key = %key, "View closed, discarding load result");
            return LoadOutcome::Cancelled;
        }
        target.set_loading(false);

        match network {
            Ok(true) => LoadOutcome::Fresh,
            Ok(false) => LoadOutcome::Cancelled,
            Err(e) => {
                warn!(key = %key, error = %e, "Refresh failed, keeping current data");
                if target.origin() == Origin::Empty {
                    LoadOutcome::Empty
                } else {
                    LoadOutcome::Stale
                }
            }
        }
    }
}

/// Fill `target` from `fetch` alone, for data that is never cached.
///
/// Same outcome rules as [`CacheLoader::load`].
pub async fn fetch_into<T, G, F>(scope: &ViewScope, target: &G, fetch: F) -> LoadOutcome
where
    G: LoadTarget<T>,
    F: Future<Output = Result<T, ClientError>> + Send,
{
    if !scope.is_active() {
        return LoadOutcome::Cancelled;
    }
    target.set_loading(true);
    let result = fetch.await;

    if !scope.is_active() {
        debug!("View closed, discarding fetch result");
        return LoadOutcome::Cancelled;
    }
    target.set_loading(false);

    match result {
        Ok(payload) => {
            target.replace(payload, Origin::Network);
            LoadOutcome::Fresh
        }
        Err(e) => {
            warn!(error = %e, "Fetch failed, keeping current data");
            if target.origin() == Origin::Empty {
                LoadOutcome::Empty
            } else {
                LoadOutcome::Stale
            }
        }
    }
}
