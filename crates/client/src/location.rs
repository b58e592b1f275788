//! Best-effort device position.

use std::future::Future;

use souk_core::Coordinates;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a position could not be obtained.
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    /// The user declined location access.
    #[error("location permission denied")]
    PermissionDenied,

    /// The platform could not produce a fix.
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Platform location capability.
pub trait LocationProvider: Send + Sync {
    /// Current device position.
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// A provider that always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// A provider for devices where location access was refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocation;

impl LocationProvider for DeniedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Resolves a position, falling back to a fixed coordinate on any failure.
#[derive(Debug, Clone)]
pub struct Locator<L> {
    provider: L,
    fallback: Coordinates,
}

impl<L: LocationProvider> Locator<L> {
    #[must_use]
    pub const fn new(provider: L, fallback: Coordinates) -> Self {
        Self { provider, fallback }
    }

    /// The device position, or the fallback if it cannot be obtained.
    pub async fn position(&self) -> Coordinates {
        match self.provider.current_position().await {
            Ok(position) if position.latitude.is_finite() && position.longitude.is_finite() => {
                debug!(lat = position.latitude, lng = position.longitude, "Using device location");
                position
            }
            Ok(_) => {
                warn!("Device returned a non-finite position, using fallback");
                self.fallback
            }
            Err(LocationError::PermissionDenied) => {
                debug!("Location permission denied, using fallback");
                self.fallback
            }
            Err(e) => {
                warn!(error = %e, "Location unavailable, using fallback");
                self.fallback
            }
        }
    }

    #[must_use]
    pub const fn fallback(&self) -> Coordinates {
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: Coordinates = Coordinates::new(36.8065, 10.1815);

    #[tokio::test]
    async fn test_device_position_used() {
        let here = Coordinates::new(34.74, 10.76);
        let locator = Locator::new(FixedLocation(here), FALLBACK);
        assert_eq!(locator.position().await, here);
    }

    #[tokio::test]
    async fn test_denied_falls_back() {
        let locator = Locator::new(DeniedLocation, FALLBACK);
        assert_eq!(locator.position().await, FALLBACK);
    }

    #[tokio::test]
    async fn test_nan_position_falls_back() {
        let locator = Locator::new(FixedLocation(Coordinates::new(f64::NAN, 1.0)), FALLBACK);
        assert_eq!(locator.position().await, FALLBACK);
    }
}
