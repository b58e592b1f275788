//! Search history commands.

use souk_client::ClientState;
use tracing::info;

use super::CliError;
use crate::output;

/// List recent searches, newest first.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list(state: &ClientState) -> Result<(), CliError> {
    let entries = state.history().list().await?;
    output::history(&entries);
    Ok(())
}

/// Remove one search from history.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn remove(state: &ClientState, query: &str) -> Result<(), CliError> {
    if state.history().remove(query).await? {
        info!(query, "Removed from search history");
    } else {
        info!(query, "Not in search history");
    }
    Ok(())
}

/// Remove every search from history.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn clear(state: &ClientState) -> Result<(), CliError> {
    state.history().clear().await?;
    info!("Cleared search history");
    Ok(())
}
