//! Type-safe price representation using decimal arithmetic.
//!
//! The backend quotes a single currency, so a price is just a non-negative
//! decimal amount. Discounts are derived from an optional original price and
//! only exist when the original price is strictly higher.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A product price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Decimal::ZERO {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whole-number discount percentage relative to `original`.
    ///
    /// Returns `None` when there is no original price, the original price is
    /// zero, or the discount would be zero or negative.
    #[must_use]
    pub fn discount_percent(&self, original: Option<Self>) -> Option<u32> {
        let original = original?;
        if original.0 <= self.0 || original.0.is_zero() {
            return None;
        }

        let percent = (original.0 - self.0) * Decimal::ONE_HUNDRED / original.0;
        let rounded = percent.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        rounded.to_u32().filter(|p| *p > 0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
