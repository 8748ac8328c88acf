//! Product prices using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10, 2)`: at most 8 integer digits and two
//! decimal places, never negative.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("price can have at most 2 decimal places")]
    TooPrecise,
    /// The amount does not fit in 10 digits.
    #[error("price must be below {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
    /// The input is not a decimal number.
    #[error("price is not a number")]
    Invalid,
}

/// A non-negative product price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of decimal places a price may carry.
    pub const SCALE: u32 = 2;

    /// Exclusive upper bound imposed by `NUMERIC(10, 2)`.
    #[must_use]
    pub fn max() -> Decimal {
        Decimal::new(100_000_000, 0)
    }

    /// Create a price, validating sign, precision and magnitude.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the amount violates any constraint.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount >= Self::max() {
            return Err(PriceError::TooLarge { max: Self::max() });
        }
        Ok(Self(amount))
    }

    /// Parse a price from user or seed-file input such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if the text is not a decimal, otherwise
    /// the same errors as [`Price::new`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s.trim().parse().map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }

    /// The raw decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Total for `units` items at this price.
    #[must_use]
    pub fn times(&self, units: u32) -> Decimal {
        self.0 * Decimal::from(units)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0;
        amount.rescale(Self::SCALE);
        write!(f, "${amount}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let price = Price::parse("19.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_zero_is_allowed() {
        assert!(Price::parse("0").is_ok());
        assert!(Price::parse("-0").is_ok());
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Price::parse("-0.01"), Err(PriceError::Negative));
    }

    #[test]
    fn test_precision_rejected() {
        assert_eq!(Price::parse("1.999"), Err(PriceError::TooPrecise));
        // Trailing zeros do not count as precision.
        assert!(Price::parse("1.500").is_ok());
    }

    #[test]
    fn test_magnitude_rejected() {
        assert!(matches!(
            Price::parse("100000000"),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(Price::parse("99999999.99").is_ok());
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(Price::parse("ten dollars"), Err(PriceError::Invalid));
    }

    #[test]
    fn test_times() {
        let price = Price::parse("2.50").unwrap();
        assert_eq!(price.times(4), Decimal::new(1000, 2));
        assert_eq!(price.times(0), Decimal::ZERO);
    }

    #[test]
    fn test_display_pads_cents() {
        assert_eq!(Price::parse("5").unwrap().to_string(), "$5.00");
        assert_eq!(Price::parse("5.5").unwrap().to_string(), "$5.50");
    }
}
