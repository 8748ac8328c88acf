//! Windsor Goods Core - domain types and storefront rules.
//!
//! This crate provides the types and pure business rules shared by all
//! Windsor Goods components:
//! - `storefront` - Public web store (axum)
//! - `cli` - Command-line tools for migrations, seeding and stock management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Every rule that decides *whether* something may happen
//! (an order against stock, a session expiring, a form being accepted) lives
//! here so it can be tested without a running database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, usernames, prices and enums
//! - [`ledger`] - Stock levels, order reservation and refills
//! - [`interest`] - Product interest submissions
//! - [`login_gate`] - Session login timestamps and the one-hour expiry rule
//! - [`history`] - Order history summaries
//! - [`forms`] - Submitted form structs and their validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod forms;
pub mod history;
pub mod interest;
pub mod ledger;
pub mod login_gate;
pub mod types;

pub use history::OrderHistory;
pub use interest::InterestChoice;
pub use ledger::{Reservation, Stock, StockError};
pub use login_gate::{LoginGate, LoginState};
pub use types::*;
