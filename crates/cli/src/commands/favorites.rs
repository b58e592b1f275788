//! Favorites commands.
//!
//! Favorites live in the local store only; `add` fetches the product once to
//! snapshot its title, price and image.

use souk_client::ClientState;
use tracing::info;

use super::{CliError, parse_product_id};
use crate::output;

/// List favorites, most recently added first.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list(state: &ClientState) -> Result<(), CliError> {
    let favorites = state.favorites().list().await?;
    output::favorites(&favorites);
    Ok(())
}

/// Add a product to favorites.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the product cannot be fetched, or
/// the store cannot be written.
pub async fn add(state: &ClientState, id: &str) -> Result<(), CliError> {
    let id = parse_product_id(id)?;
    let detail = state.product_details().fetch(&id).await?;
    if state.favorites().add(&detail.product).await? {
        info!(product_id = %id, "Added to favorites");
    } else {
        info!(product_id = %id, "Already a favorite");
    }
    Ok(())
}

/// Remove a product from favorites.
///
/// # Errors
///
/// Returns an error if the ID is invalid or the store cannot be written.
pub async fn remove(state: &ClientState, id: &str) -> Result<(), CliError> {
    let id = parse_product_id(id)?;
    if state.favorites().remove(&id).await? {
        info!(product_id = %id, "Removed from favorites");
    } else {
        info!(product_id = %id, "Not a favorite");
    }
    Ok(())
}

/// Remove every favorite.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn clear(state: &ClientState) -> Result<(), CliError> {
    let removed = state.favorites().clear().await?;
    info!(removed, "Cleared favorites");
    Ok(())
}
