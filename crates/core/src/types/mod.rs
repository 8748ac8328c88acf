//! Core types for Windsor Goods.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod id;
pub mod price;
pub mod status;

pub use account::{Email, EmailError, Username, UsernameError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::*;
