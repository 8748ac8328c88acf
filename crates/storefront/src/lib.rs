//! Windsor Goods storefront library.
//!
//! The catalog, ordering, account and profile pages of the Windsor Goods
//! store, exposed as a library so the binary, the CLI and tests share them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
