//! Command implementations.
//!
//! Every command runs against one [`ClientState`] and a single [`ViewScope`]
//! that stays open for the lifetime of the process.

pub mod favorites;
pub mod history;

use souk_client::location::{DeniedLocation, FixedLocation, LocationProvider};
use souk_client::loader::LoadOutcome;
use souk_client::notifications::PushStatus;
use souk_client::pagination::PageResult;
use souk_client::scope::ViewScope;
use souk_client::{ClientError, ClientState};
use souk_core::{Coordinates, ProductId, SearchFilters, distance_km};
use thiserror::Error;
use tracing::{info, warn};

use crate::SearchOptions;
use crate::output;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Client operation failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A command-line argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Nothing could be loaded from the network or the cache.
    #[error("Nothing to show: the backend is unreachable and nothing is cached")]
    NoData,
}

pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId, CliError> {
    ProductId::parse(raw).map_err(|e| CliError::Client(e.into()))
}

/// Fails unless the load produced something to display.
fn require_data(outcome: LoadOutcome) -> Result<(), CliError> {
    match outcome {
        LoadOutcome::Fresh => Ok(()),
        LoadOutcome::Stale => {
            warn!("Showing cached data, refresh failed");
            Ok(())
        }
        LoadOutcome::Empty | LoadOutcome::Cancelled => Err(CliError::NoData),
    }
}

/// Show the discovery feed, loading up to `pages` pages.
///
/// # Errors
///
/// Returns an error if the first page cannot be loaded from the network or
/// the cache, or if a later page fails.
pub async fn feed(
    state: &ClientState,
    category: Option<String>,
    pages: u32,
) -> Result<(), CliError> {
    if pages == 0 {
        return Err(CliError::InvalidArgument("--pages must be at least 1".to_string()));
    }

    let scope = ViewScope::new();
    let feed = state.feed();
    let outcome = if category.is_some() {
        feed.set_category(category, &scope).await
    } else {
        feed.refresh(&scope).await
    };
    require_data(outcome)?;

    for _ in 1..pages {
        match feed.load_more(&scope).await? {
            PageResult::Appended(added) => info!(added, "Loaded next page"),
            PageResult::Exhausted => break,
            PageResult::Busy | PageResult::Cancelled => {}
        }
    }

    output::products(&feed.items());
    output::more_available(feed.has_more());
    Ok(())
}

/// Show the promoted products strip.
pub async fn promoted(state: &ClientState) {
    let scope = ViewScope::new();
    let promoted = state.promoted();
    if !promoted.refresh(&scope).await.has_data() {
        warn!("No promoted products available");
    }
    output::products(&promoted.items().await);
}

/// Show shops near `position`, or near the configured fallback.
pub async fn shops(state: &ClientState, position: Option<(f64, f64)>, filter: Option<&str>) {
    match position {
        Some((lat, lng)) => {
            show_shops(state, FixedLocation(Coordinates::new(lat, lng)), filter).await;
        }
        None => show_shops(state, DeniedLocation, filter).await,
    }
}

async fn show_shops<L: LocationProvider>(state: &ClientState, provider: L, filter: Option<&str>) {
    let scope = ViewScope::new();
    let nearby = state.nearby_shops(provider);
    if !nearby.refresh(&scope).await.has_data() {
        warn!("No shops available");
    }

    let shops = match filter {
        Some(query) => nearby.filter(query),
        None => nearby.shops(),
    };
    output::shops(nearby.position(), &shops);
}

/// Show one product with its seller and related listings.
///
/// # Errors
///
/// Returns an error if the ID is invalid or the product cannot be loaded.
pub async fn product(state: &ClientState, id: &str) -> Result<(), CliError> {
    let id = parse_product_id(id)?;
    let detail = state.product_details().fetch(&id).await?;
    output::product_detail(&detail);
    Ok(())
}

/// Run a search, applying any filters given on the command line.
///
/// # Errors
///
/// Returns an error if the query is blank, the search fails, or a later
/// page fails.
pub async fn search(
    state: &ClientState,
    query: &str,
    options: &SearchOptions,
) -> Result<(), CliError> {
    if query.trim().is_empty() {
        return Err(CliError::InvalidArgument("query must not be blank".to_string()));
    }
    if options.pages == 0 {
        return Err(CliError::InvalidArgument("--pages must be at least 1".to_string()));
    }
    if let (Some(min), Some(max)) = (options.min_price, options.max_price)
        && min > max
    {
        return Err(CliError::InvalidArgument(format!(
            "--min-price {min} exceeds --max-price {max}"
        )));
    }

    let scope = ViewScope::new();
    let session = state.search().await;

    // Preferences are only rewritten when the command line changes them
    if let Some(sort) = options.sort {
        session.set_sort(sort.into(), &scope).await;
    }
    let mut filters = if options.reset_filters {
        SearchFilters::default()
    } else {
        session.preferences().filters
    };
    let before = filters.clone();
    merge_filters(&mut filters, options);
    if filters != before {
        session.set_filters(filters, &scope).await;
    }

    require_data(session.submit(query, &scope).await)?;
    for _ in 1..options.pages {
        if matches!(session.load_more(&scope).await?, PageResult::Exhausted) {
            break;
        }
    }

    let results = match options.filter.as_deref() {
        Some(needle) => session.filter_local(needle),
        None => session.results(),
    };
    output::search_summary(&session.query(), session.total(), &session.preferences());
    output::products(&results);
    output::facets(&session.facets());
    output::more_available(session.has_more());
    Ok(())
}

fn merge_filters(filters: &mut SearchFilters, options: &SearchOptions) {
    if let Some(category) = &options.category {
        filters.category = Some(category.clone());
    }
    if options.min_price.is_some() {
        filters.min_price = options.min_price;
    }
    if options.max_price.is_some() {
        filters.max_price = options.max_price;
    }
    if let Some(condition) = &options.condition {
        filters.condition = Some(condition.clone());
    }
    if let Some(city) = &options.city {
        filters.city = Some(city.clone());
    }
}

/// Show autocomplete suggestions for a partial query.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn suggest(state: &ClientState, partial: &str) -> Result<(), CliError> {
    let session = state.search().await;
    let suggestions = session.suggest(partial).await?;
    output::suggestions(&suggestions);
    Ok(())
}

/// Register the configured push token for the configured user.
///
/// # Errors
///
/// Returns an error if the backend rejects the registration.
pub async fn register_push(state: &ClientState, force: bool) -> Result<(), CliError> {
    let status = state
        .push_registrar()
        .register(state.config().user_id, force)
        .await?;
    match status {
        PushStatus::Registered => info!("Push token registered"),
        PushStatus::Unchanged => info!("Push token already registered, nothing sent"),
        PushStatus::NoToken => warn!("No push token configured (SOUK_PUSH_TOKEN)"),
    }
    Ok(())
}

/// Drop every cached feed and shop list.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn clear_cache(state: &ClientState) -> Result<(), CliError> {
    let removed = state.repo().clear_caches().await.map_err(ClientError::from)?;
    info!(removed, "Cleared cached data");
    Ok(())
}

/// Print the great-circle distance between two points.
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) {
    output::distance(distance_km(lat1, lng1, lat2, lng2));
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_merge_filters_keeps_unset_fields() {
        let mut filters = SearchFilters {
            category: Some("furniture".to_string()),
            city: Some("Sfax".to_string()),
            ..SearchFilters::default()
        };
        let options = SearchOptions {
            sort: None,
            category: None,
            min_price: None,
            max_price: Some(Decimal::new(120, 0)),
            condition: None,
            city: Some("Tunis".to_string()),
            reset_filters: false,
            pages: 1,
            filter: None,
        };
        merge_filters(&mut filters, &options);

        assert_eq!(filters.category.as_deref(), Some("furniture"));
        assert_eq!(filters.max_price, Some(Decimal::new(120, 0)));
        assert_eq!(filters.city.as_deref(), Some("Tunis"));
        assert!(filters.min_price.is_none());
    }

    #[test]
    fn test_parse_product_id_rejects_blank() {
        assert!(matches!(
            parse_product_id("  "),
            Err(CliError::Client(ClientError::InvalidId(_)))
        ));
        assert!(parse_product_id("65f1c2").is_ok());
    }

    #[test]
    fn test_require_data() {
        assert!(require_data(LoadOutcome::Fresh).is_ok());
        assert!(require_data(LoadOutcome::Stale).is_ok());
        assert!(matches!(require_data(LoadOutcome::Empty), Err(CliError::NoData)));
    }
}
