//! Domain models for storefront.
//!
//! These are the validated shapes handlers and templates work with; the
//! repositories in [`crate::db`] convert raw rows into them.

pub mod catalog;
pub mod client;
pub mod order;
pub mod profile;
pub mod session;
pub mod user;

pub use catalog::{Category, Product};
pub use client::Client;
pub use order::Order;
pub use profile::Profile;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
