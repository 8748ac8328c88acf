//! Authentication route handlers.
//!
//! Handles registration, username/password login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use windsor_goods_core::forms::{FieldErrors, RegisterForm};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, log_in, log_out};
use crate::models::CurrentUser;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Where a successful login lands.
const AFTER_LOGIN_PATH: &str = "/orders/mine";

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub username: String,
    pub error: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub form: RegisterForm,
    pub errors: FieldErrors,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    LoginTemplate {
        current_user,
        username: String::new(),
        error: None,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e @ (AuthError::InvalidCredentials | AuthError::AccountDisabled)) => {
            tracing::warn!(reason = %e, "Login refused");
            return Ok(LoginTemplate {
                current_user: None,
                username: form.username,
                error: Some(e.login_message()),
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let current_user = CurrentUser {
        id: user.id,
        username: user.username.to_string(),
    };
    log_in(&session, &current_user, Utc::now().naive_utc()).await?;
    set_sentry_user(&user.id, user.username.as_str());

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Redirect::to(AFTER_LOGIN_PATH).into_response())
}

/// Log out and return to the login page.
#[instrument(skip(session, current_user))]
pub async fn logout(session: Session, RequireAuth(current_user): RequireAuth) -> Result<Response> {
    log_out(&session).await?;
    clear_sentry_user();

    tracing::info!(user_id = %current_user.id, "User logged out");

    Ok(Redirect::to(crate::middleware::auth::LOGIN_PATH).into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    RegisterTemplate {
        current_user,
        form: RegisterForm::default(),
        errors: FieldErrors::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, current_user, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => {
            return Ok(RegisterTemplate {
                current_user,
                form: blank_passwords(form),
                errors,
            }
            .into_response());
        }
    };

    match AuthService::new(state.pool()).register(&registration).await {
        Ok(_) => Ok(Redirect::to(crate::middleware::auth::LOGIN_PATH).into_response()),
        Err(AuthError::UserAlreadyExists) => {
            let mut errors = FieldErrors::new();
            errors.add("username", "A user with that username already exists.");
            Ok(RegisterTemplate {
                current_user,
                form: blank_passwords(form),
                errors,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Passwords are never echoed back into a re-rendered form.
fn blank_passwords(form: RegisterForm) -> RegisterForm {
    RegisterForm {
        password1: String::new(),
        password2: String::new(),
        ..form
    }
}
