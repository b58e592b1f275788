//! Souk client library.
//!
//! Everything a marketplace screen needs below the UI layer: the backend API
//! client, the local device store, and the loaders that combine them.
//!
//! # Architecture
//!
//! - `api` talks to the REST backend and validates responses into
//!   `souk_core` types at the boundary
//! - `store` persists small JSON blobs under a fixed [`store::StoreKey`] schema
//! - `loader` implements stale-while-revalidate: show a fresh-enough cached
//!   blob at once, always refresh from the network, and let the network result
//!   win
//! - `pagination` appends pages while dropping items already seen
//! - `favorites` and `history` are small ledgers kept in the store
//! - `feed`, `shops`, `promoted`, `detail`, `search` and `notifications` are
//!   the screen-level components built from the pieces above
//!
//! Screens own a [`scope::ViewScope`] and close it on unmount; results that
//! arrive afterwards are discarded.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod clock;
pub mod config;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod feed;
pub mod history;
pub mod loader;
pub mod location;
pub mod notifications;
pub mod pagination;
pub mod promoted;
pub mod scope;
pub mod search;
pub mod shops;
pub mod state;
pub mod store;

mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ClientError;
pub use state::ClientState;
