//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in user in route handlers, and
//! the helpers that write and clear the login in the session.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDateTime;
use tower_sessions::{Expiry, Session};

use windsor_goods_core::LoginGate;

use crate::models::{CurrentUser, session_keys};

/// Path unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Session inactivity expiry applied at login.
const LOGIN_EXPIRY_SECONDS: i64 = LoginGate::DEFAULT_WINDOW_SECS;

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Session layer missing from the stack.
    NoSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NoSession)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Record a login in the session.
///
/// Rotates the session id, stores the user and the login timestamp, and
/// sets the session to expire after an hour of inactivity.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn log_in(
    session: &Session,
    user: &CurrentUser,
    at: NaiveDateTime,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    session
        .insert(session_keys::LAST_LOGIN, LoginGate::stamp(at))
        .await?;
    session.set_expiry(Some(Expiry::OnInactivity(
        tower_sessions::cookie::time::Duration::seconds(LOGIN_EXPIRY_SECONDS),
    )));
    Ok(())
}

/// End the session (logout or expiry).
///
/// # Errors
///
/// Returns an error if the session store cannot delete the session.
pub async fn log_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
