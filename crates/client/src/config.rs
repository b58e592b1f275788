//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SOUK_API_BASE_URL` - Base URL of the marketplace REST backend
//!
//! ## Optional
//! - `SOUK_STORE_URL` - `SQLite` URL for the local store (default: `sqlite://souk.db?mode=rwc`)
//! - `SOUK_PAGE_SIZE` - Items per page for feeds and search (default: 10)
//! - `SOUK_CACHE_TTL_SECS` - Cache envelope expiry in seconds (default: 300)
//! - `SOUK_NEARBY_RADIUS_KM` - Radius for nearby shops (default: 50)
//! - `SOUK_DEFAULT_LATITUDE` / `SOUK_DEFAULT_LONGITUDE` - Fallback position when
//!   location is unavailable (default: 36.8065, 10.1815)
//! - `SOUK_HTTP_TIMEOUT_SECS` - Backend request timeout (default: 15)
//! - `SOUK_USER_ID` - Signed-in user ID, sent with push token registration
//! - `SOUK_PUSH_TOKEN` - Messaging token to register for push notifications
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use souk_core::{CACHE_EXPIRY, Coordinates, UserId};
use thiserror::Error;
use url::Url;

const DEFAULT_STORE_URL: &str = "sqlite://souk.db?mode=rwc";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_RADIUS_KM: f64 = 50.0;
const DEFAULT_LATITUDE: f64 = 36.8065;
const DEFAULT_LONGITUDE: f64 = 10.1815;
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const MAX_PAGE_SIZE: u32 = 100;

/// Blocklist of placeholder patterns that must never be registered as push tokens.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// `SQLite` URL for the local device store
    pub store_url: String,
    /// Items requested per page
    pub page_size: u32,
    /// How long cached envelopes may be shown
    pub cache_ttl: Duration,
    /// Search radius for nearby shops, in kilometers
    pub nearby_radius_km: f64,
    /// Position used when the device cannot provide one
    pub default_location: Coordinates,
    /// Signed-in user, if any
    pub user_id: Option<UserId>,
    /// Messaging token for push registration
    pub push: PushConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Build an API configuration from a base URL string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout,
        })
    }
}

/// Push notification configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Default)]
pub struct PushConfig {
    /// Messaging token, if one was provided
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let base_url = env.required("SOUK_API_BASE_URL")?;
        let timeout = Duration::from_secs(env.parsed("SOUK_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);
        let api = ApiConfig::new(&base_url, timeout)
            .map_err(|e| rename_var(e, "SOUK_API_BASE_URL"))?;

        let page_size = env.parsed("SOUK_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidEnvVar(
                "SOUK_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE} (got {page_size})"),
            ));
        }

        let cache_ttl = env
            .optional_parsed::<u64>("SOUK_CACHE_TTL_SECS")?
            .map_or(CACHE_EXPIRY, Duration::from_secs);

        let nearby_radius_km = env.parsed("SOUK_NEARBY_RADIUS_KM", DEFAULT_RADIUS_KM)?;
        if !nearby_radius_km.is_finite() || nearby_radius_km <= 0.0 {
            return Err(ConfigError::InvalidEnvVar(
                "SOUK_NEARBY_RADIUS_KM".to_string(),
                "must be a positive number".to_string(),
            ));
        }

        let default_location = Coordinates::new(
            env.parsed("SOUK_DEFAULT_LATITUDE", DEFAULT_LATITUDE)?,
            env.parsed("SOUK_DEFAULT_LONGITUDE", DEFAULT_LONGITUDE)?,
        );
        validate_coordinates(&default_location)?;

        let user_id = env.optional_parsed::<i64>("SOUK_USER_ID")?.map(UserId::new);

        let token = env
            .optional("SOUK_PUSH_TOKEN")
            .map(|t| validate_push_token(&t, "SOUK_PUSH_TOKEN").map(|()| SecretString::from(t)))
            .transpose()?;

        Ok(Self {
            api,
            store_url: env.or_default("SOUK_STORE_URL", DEFAULT_STORE_URL),
            page_size,
            cache_ttl,
            nearby_radius_km,
            default_location,
            user_id,
            push: PushConfig { token },
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/optional/default accessors.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse an optional variable.
    fn optional_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.optional_parsed(key)?.unwrap_or(default))
    }
}

fn rename_var(err: ConfigError, key: &str) -> ConfigError {
    match err {
        ConfigError::InvalidEnvVar(_, msg) => ConfigError::InvalidEnvVar(key.to_string(), msg),
        other => other,
    }
}

/// Parse and normalize the backend base URL.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("base_url".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be used as a base URL".to_string()));
    }

    // Relative joins replace the last path segment unless the path ends in '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn validate_coordinates(c: &Coordinates) -> Result<(), ConfigError> {
    if !(-90.0..=90.0).contains(&c.latitude) {
        return Err(ConfigError::InvalidEnvVar(
            "SOUK_DEFAULT_LATITUDE".to_string(),
            format!("{} is outside -90..=90", c.latitude),
        ));
    }
    if !(-180.0..=180.0).contains(&c.longitude) {
        return Err(ConfigError::InvalidEnvVar(
            "SOUK_DEFAULT_LONGITUDE".to_string(),
            format!("{} is outside -180..=180", c.longitude),
        ));
    }
    Ok(())
}

/// Reject tokens that are obviously copied from documentation.
fn validate_push_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InvalidEnvVar(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
