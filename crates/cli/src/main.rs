//! Souk CLI - browse the marketplace and manage local state from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # First page of the discovery feed, then two more
//! souk feed --pages 3
//!
//! # Shops near a position (falls back to the configured default)
//! souk shops --lat 36.80 --lng 10.18
//!
//! # Search with filters and sort order (remembered for next time)
//! souk search "brass lamp" --sort price-asc --max-price 120
//!
//! # Favorites and history
//! souk favorites add 65f1c2
//! souk history list
//! ```
//!
//! # Commands
//!
//! - `feed` - Discovery feed, optionally by category
//! - `promoted` - Promoted products strip
//! - `shops` - Nearby shops sorted by distance
//! - `product` - Product detail
//! - `search` / `suggest` - Remote search and autocomplete
//! - `favorites` / `history` - Local ledgers
//! - `register-push` - Register the configured push token
//! - `cache clear` - Drop cached feeds and shop lists
//! - `distance` - Great-circle distance between two points

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use souk_client::ClientState;
use souk_client::config::ClientConfig;
use souk_core::SortBy;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::CliError;

#[derive(Parser)]
#[command(name = "souk")]
#[command(author, version, about = "Souk marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the discovery feed
    Feed {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Show the promoted products strip
    Promoted,
    /// Show shops near a position
    Shops {
        /// Latitude of the position (default: configured fallback)
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the position
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Only show shops whose name or city contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show a product with its seller and related listings
    Product {
        /// Product ID
        id: String,
    },
    /// Search the marketplace
    Search {
        /// Search query
        query: String,

        #[command(flatten)]
        options: SearchOptions,
    },
    /// Suggest completions for a partial query
    Suggest {
        /// Partial query
        partial: String,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Manage search history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Register the configured push token
    RegisterPush {
        /// Send even if this user and token were registered before
        #[arg(long)]
        force: bool,
    },
    /// Manage cached data
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Great-circle distance in kilometers between two points
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lng1: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
        #[arg(allow_hyphen_values = true)]
        lng2: f64,
    },
}

#[derive(clap::Args)]
pub struct SearchOptions {
    /// Result ordering (remembered for later searches)
    #[arg(short, long, value_enum)]
    sort: Option<SortArg>,

    /// Category filter
    #[arg(long)]
    category: Option<String>,

    /// Minimum price
    #[arg(long)]
    min_price: Option<rust_decimal::Decimal>,

    /// Maximum price
    #[arg(long)]
    max_price: Option<rust_decimal::Decimal>,

    /// Condition filter, e.g. `new` or `used`
    #[arg(long)]
    condition: Option<String>,

    /// City filter
    #[arg(long)]
    city: Option<String>,

    /// Drop all remembered filters before searching
    #[arg(long)]
    reset_filters: bool,

    /// Number of pages to load
    #[arg(short, long, default_value_t = 1)]
    pages: u32,

    /// Narrow the loaded results locally by this text
    #[arg(short, long)]
    filter: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Relevance,
    Newest,
    PriceAsc,
    PriceDesc,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => Self::Relevance,
            SortArg::Newest => Self::Newest,
            SortArg::PriceAsc => Self::PriceAsc,
            SortArg::PriceDesc => Self::PriceDesc,
        }
    }
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites, most recent first
    List,
    /// Add a product by ID
    Add { id: String },
    /// Remove a product by ID
    Remove { id: String },
    /// Remove every favorite
    Clear,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List recent searches
    List,
    /// Remove one search
    Remove { query: String },
    /// Remove every search
    Clear,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop cached feeds and shop lists
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "souk_client=info,souk_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The distance command needs no configuration
    if let Commands::Distance {
        lat1,
        lng1,
        lat2,
        lng2,
    } = cli.command
    {
        init_tracing();
        commands::distance(lat1, lng1, lat2, lng2);
        return;
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli.command, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: ClientConfig) -> Result<(), CliError> {
    let state = ClientState::connect(config).await?;

    match command {
        Commands::Feed { category, pages } => commands::feed(&state, category, pages).await?,
        Commands::Promoted => commands::promoted(&state).await,
        Commands::Shops { lat, lng, filter } => {
            commands::shops(&state, lat.zip(lng), filter.as_deref()).await;
        }
        Commands::Product { id } => commands::product(&state, &id).await?,
        Commands::Search { query, options } => {
            commands::search(&state, &query, &options).await?;
        }
        Commands::Suggest { partial } => commands::suggest(&state, &partial).await?,
        Commands::Favorites { action } => match action {
            FavoritesAction::List => commands::favorites::list(&state).await?,
            FavoritesAction::Add { id } => commands::favorites::add(&state, &id).await?,
            FavoritesAction::Remove { id } => commands::favorites::remove(&state, &id).await?,
            FavoritesAction::Clear => commands::favorites::clear(&state).await?,
        },
        Commands::History { action } => match action {
            HistoryAction::List => commands::history::list(&state).await?,
            HistoryAction::Remove { query } => commands::history::remove(&state, &query).await?,
            HistoryAction::Clear => commands::history::clear(&state).await?,
        },
        Commands::RegisterPush { force } => commands::register_push(&state, force).await?,
        Commands::Cache { action } => match action {
            CacheAction::Clear => commands::clear_cache(&state).await?,
        },
        Commands::Distance { .. } => {}
    }
    Ok(())
}
