//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `ordering` - Order placement against stock and order history
//! - `profile` - Profile updates and avatar uploads

pub mod auth;
pub mod ordering;
pub mod profile;

pub use auth::{AuthError, AuthService};
pub use ordering::{ClientHistory, OrderError, OrderService};
pub use profile::{AvatarUpload, ProfileError, ProfileService};
