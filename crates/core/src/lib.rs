//! Souk Core - Shared domain types for the marketplace client.
//!
//! This crate provides the types and pure rules used by every Souk component:
//! - `client` - Backend API client, local store and screen-level loaders
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, products, shops, favorites, search
//!   history, cache envelopes and the haversine distance function

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
