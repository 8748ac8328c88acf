//! Home and about page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tower_sessions::cookie::{Cookie, time::Duration};
use tracing::instrument;

use windsor_goods_core::LoginState;
use windsor_goods_core::login_gate::LOGGED_OUT_TEXT;

use crate::db::CategoryRepository;
use crate::error::{Result, clear_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, log_out};
use crate::models::{Category, CurrentUser, session_keys};
use crate::state::AppState;

/// Number of categories listed on the index page.
const INDEX_CATEGORY_LIMIT: i64 = 10;

/// Cookie counting visits to the about page.
pub const ABOUT_VISITS_COOKIE: &str = "about_visits";

/// Lifetime of the about-visits cookie.
const ABOUT_VISITS_MAX_AGE_SECS: i64 = 300;

/// Index page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub current_user: Option<CurrentUser>,
    pub categories: Vec<Category>,
    /// Login time, or the logged-out text.
    pub last_login: String,
    /// Shown when an expired session was just ended.
    pub message: Option<&'static str>,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub current_user: Option<CurrentUser>,
    pub visits: u32,
}

/// Display the index page.
///
/// Checks the session's login time on every view and ends sessions that
/// logged in more than an hour ago.
#[instrument(skip(state, session, current_user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<Response> {
    let raw: Option<String> = session.get(session_keys::LAST_LOGIN).await?;
    let login = state
        .login_gate()
        .evaluate(raw.as_deref(), Utc::now().naive_utc());

    let mut current_user = current_user;
    if login.must_log_out() {
        tracing::info!(
            username = current_user.as_ref().map_or("", |u| u.username.as_str()),
            "Ending expired session"
        );
        log_out(&session).await?;
        clear_sentry_user();
        current_user = None;
    }

    let categories = CategoryRepository::new(state.pool())
        .list(INDEX_CATEGORY_LIMIT)
        .await?;

    let last_login = match login {
        LoginState::Active { since } => since.format("%Y-%m-%d %H:%M:%S").to_string(),
        LoginState::LoggedOut | LoginState::Expired { .. } => LOGGED_OUT_TEXT.to_owned(),
    };

    Ok(IndexTemplate {
        current_user,
        categories,
        last_login,
        message: login.message(),
    }
    .into_response())
}

/// Display the about page and count the visitor's views.
#[instrument(skip(headers, current_user))]
pub async fn about(headers: HeaderMap, OptionalAuth(current_user): OptionalAuth) -> Response {
    let visits = next_visit_count(read_cookie(&headers, ABOUT_VISITS_COOKIE).as_deref());

    let cookie = Cookie::build((ABOUT_VISITS_COOKIE, visits.to_string()))
        .max_age(Duration::seconds(ABOUT_VISITS_MAX_AGE_SECS))
        .path("/")
        .http_only(true)
        .build();

    let mut response = AboutTemplate {
        current_user,
        visits,
    }
    .into_response();

    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    response
}

/// Visit count to record: one more than the cookie, or 1 when the cookie is
/// missing or not a number.
#[must_use]
pub fn next_visit_count(previous: Option<&str>) -> u32 {
    previous
        .and_then(|v| v.trim().parse::<u32>().ok())
        .map_or(1, |n| n.saturating_add(1))
}

/// Read a cookie value from the request headers.
fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_next_visit_count() {
        assert_eq!(next_visit_count(None), 1);
        assert_eq!(next_visit_count(Some("1")), 2);
        assert_eq!(next_visit_count(Some("41")), 42);
        assert_eq!(next_visit_count(Some("banana")), 1);
        assert_eq!(next_visit_count(Some("-3")), 1);
    }

    #[test]
    fn test_read_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("wg_session=abc; about_visits=4; theme=dark"),
        );
        assert_eq!(
            read_cookie(&headers, ABOUT_VISITS_COOKIE).as_deref(),
            Some("4")
        );
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
