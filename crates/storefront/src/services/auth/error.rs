//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Correct password, but the account has been disabled.
    #[error("account disabled")]
    AccountDisabled,

    /// Username is already taken.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message shown on the login page.
    #[must_use]
    pub const fn login_message(&self) -> &'static str {
        match self {
            Self::AccountDisabled => "Your account is disabled.",
            Self::InvalidCredentials | Self::UserAlreadyExists => "Invalid login details.",
            Self::Repository(_) | Self::PasswordHash => "Something went wrong, please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_messages() {
        assert_eq!(
            AuthError::InvalidCredentials.login_message(),
            "Invalid login details."
        );
        assert_eq!(
            AuthError::AccountDisabled.login_message(),
            "Your account is disabled."
        );
    }
}
