//! User account commands.
//!
//! # Usage
//!
//! ```bash
//! wg-cli user deactivate jdoe
//! wg-cli user activate jdoe
//! ```
//!
//! Deactivated users keep their data but are refused at login.

use windsor_goods_storefront::db::{RepositoryError, UserRepository};

use super::ConnectError;

/// Errors that can occur while changing a user.
#[derive(Debug, thiserror::Error)]
pub enum UserCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Allow or refuse a user's logins.
///
/// # Errors
///
/// Returns `UserCommandError::NotFound` if no user has that username.
pub async fn set_active(username: &str, active: bool) -> Result<(), UserCommandError> {
    let pool = super::connect().await?;

    UserRepository::new(&pool)
        .set_active(username, active)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => UserCommandError::NotFound(username.to_owned()),
            other => UserCommandError::Repository(other),
        })?;

    if active {
        tracing::info!(username, "User activated");
    } else {
        tracing::info!(username, "User deactivated");
    }
    Ok(())
}
