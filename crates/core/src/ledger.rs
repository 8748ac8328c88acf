//! Stock ledger rules.
//!
//! A product's stock is an integer in `0..=1000`. Orders reserve units from
//! it and management refills add units back. The functions here only decide;
//! callers persist the outcome inside a single database transaction with the
//! product row locked, so the check and the decrement cannot interleave with
//! another order.

use serde::{Deserialize, Serialize};

/// Message shown when an order is accepted.
pub const ORDER_PLACED_MESSAGE: &str = "Your order has been placed successfully.";

/// Message shown when an order asks for more units than are in stock.
pub const INSUFFICIENT_STOCK_MESSAGE: &str =
    "We do not have sufficient stock to fill your order !!!";

/// Errors produced by stock operations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockError {
    /// The value is outside `0..=1000`.
    #[error("stock must be between 0 and {max} (got {value})")]
    OutOfRange {
        /// Rejected value.
        value: i64,
        /// Upper bound.
        max: u32,
    },
    /// An order asked for zero units.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// An order asked for more units than are available.
    #[error("requested {requested} units but only {available} in stock")]
    Insufficient {
        /// Units requested.
        requested: u32,
        /// Units available.
        available: u32,
    },
    /// A refill would push stock above the maximum.
    #[error("refilling {amount} units would exceed capacity ({available} in stock, max {max})")]
    OverCapacity {
        /// Units in stock before the refill.
        available: u32,
        /// Units requested to add.
        amount: u32,
        /// Upper bound.
        max: u32,
    },
}

/// Units of a product on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Stock(u32);

impl Stock {
    /// Largest stock a product may hold.
    pub const MAX: u32 = 1000;

    /// Stock a newly created product starts with.
    pub const DEFAULT: Self = Self(100);

    /// Units added by the bulk "increase stock" management action.
    pub const INCREASE_STEP: u32 = 50;

    /// Units added by a single product refill.
    pub const REFILL_STEP: u32 = 100;

    /// Create a stock level, validating the range.
    ///
    /// # Errors
    ///
    /// Returns `StockError::OutOfRange` when `value` is negative or above
    /// [`Stock::MAX`].
    pub fn new(value: i64) -> Result<Self, StockError> {
        u32::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or(StockError::OutOfRange {
                value,
                max: Self::MAX,
            })
    }

    /// Units on hand.
    #[must_use]
    pub const fn units(self) -> u32 {
        self.0
    }

    /// Units on hand as the database column type.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        // MAX fits comfortably in i32.
        i32::try_from(self.0).unwrap_or(i32::MAX)
    }

    /// Whether `quantity` units can be taken from this stock.
    #[must_use]
    pub const fn covers(self, quantity: u32) -> bool {
        quantity <= self.0
    }

    /// Reserve `quantity` units for an order.
    ///
    /// # Errors
    ///
    /// Returns `StockError::ZeroQuantity` for an empty order and
    /// `StockError::Insufficient` when `quantity` exceeds the stock on hand.
    pub const fn reserve(self, quantity: u32) -> Result<Reservation, StockError> {
        if quantity == 0 {
            return Err(StockError::ZeroQuantity);
        }
        if !self.covers(quantity) {
            return Err(StockError::Insufficient {
                requested: quantity,
                available: self.0,
            });
        }
        Ok(Reservation {
            quantity,
            before: self,
            after: Self(self.0 - quantity),
        })
    }

    /// Add `amount` units.
    ///
    /// # Errors
    ///
    /// Returns `StockError::OverCapacity` when the result would exceed
    /// [`Stock::MAX`]; the stock is left unchanged.
    pub fn refill(self, amount: u32) -> Result<Self, StockError> {
        self.0
            .checked_add(amount)
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or(StockError::OverCapacity {
                available: self.0,
                amount,
                max: Self::MAX,
            })
    }
}

impl Default for Stock {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Stock {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for Stock {
    type Error = StockError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Stock> for i64 {
    fn from(stock: Stock) -> Self {
        Self::from(stock.0)
    }
}

impl std::fmt::Display for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An accepted reservation: the stock before and after an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// Units reserved.
    pub quantity: u32,
    /// Stock before the order.
    pub before: Stock,
    /// Stock after the order.
    pub after: Stock,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stock(units: i64) -> Stock {
        Stock::new(units).unwrap()
    }

    #[test]
    fn test_new_range() {
        assert!(Stock::new(0).is_ok());
        assert!(Stock::new(1000).is_ok());
        assert_eq!(
            Stock::new(1001),
            Err(StockError::OutOfRange {
                value: 1001,
                max: 1000
            })
        );
        assert!(Stock::new(-1).is_err());
    }

    #[test]
    fn test_default_is_one_hundred() {
        assert_eq!(Stock::default().units(), 100);
    }

    #[test]
    fn test_reserve_accepts_up_to_stock() {
        let r = stock(10).reserve(10).unwrap();
        assert_eq!(r.before.units(), 10);
        assert_eq!(r.after.units(), 0);
    }

    #[test]
    fn test_reserve_rejects_over_stock() {
        assert_eq!(
            stock(5).reserve(6),
            Err(StockError::Insufficient {
                requested: 6,
                available: 5
            })
        );
    }

    #[test]
    fn test_reserve_rejects_zero() {
        assert_eq!(stock(5).reserve(0), Err(StockError::ZeroQuantity));
    }

    #[test]
    fn test_sequential_orders_example() {
        // stock=10, order 5 accepted -> 5; order 6 rejected -> stays 5
        let first = stock(10).reserve(5).unwrap();
        assert_eq!(first.after.units(), 5);
        assert!(first.after.reserve(6).is_err());
        assert_eq!(first.after.units(), 5);
    }

    #[test]
    fn test_accepted_reservations_conserve_units() {
        for before in [0_i64, 1, 7, 100, 1000] {
            for quantity in 0..=12_u32 {
                let s = stock(before);
                match s.reserve(quantity) {
                    Ok(r) => {
                        assert!(quantity <= s.units());
                        assert_eq!(r.after.units(), s.units() - quantity);
                    }
                    Err(_) => assert!(quantity == 0 || quantity > s.units()),
                }
            }
        }
    }

    #[test]
    fn test_refill_within_capacity() {
        assert_eq!(stock(100).refill(Stock::REFILL_STEP).unwrap().units(), 200);
        assert_eq!(stock(950).refill(Stock::INCREASE_STEP).unwrap().units(), 1000);
    }

    #[test]
    fn test_refill_over_capacity() {
        assert!(matches!(
            stock(951).refill(Stock::INCREASE_STEP),
            Err(StockError::OverCapacity { available: 951, .. })
        ));
        assert!(stock(1).refill(u32::MAX).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let s: Stock = serde_json::from_str("42").unwrap();
        assert_eq!(s.units(), 42);
        assert!(serde_json::from_str::<Stock>("2000").is_err());
    }
}
