//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Index: first categories, login time, expiry check
//! GET  /about                  - About page with a visit counter cookie
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /categories/{id}        - Category detail with its products
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail and interest form (requires auth)
//! POST /products/{id}          - Submit interest (requires auth)
//!
//! # Orders (requires auth)
//! GET  /orders/place           - Order form
//! POST /orders/place           - Place an order against stock
//! GET  /orders/mine            - Order history for the logged-in client
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action (rate limited)
//! GET  /register               - Register page
//! POST /register               - Register action (rate limited)
//! GET  /logout                 - Logout action (requires auth)
//!
//! # Profile (requires auth)
//! GET  /profile                - Profile form
//! POST /profile                - Update details and avatar (multipart)
//! ```

pub mod auth;
pub mod catalog;
pub mod home;
pub mod orders;
pub mod profile;

use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::config::RateLimitConfig;
use crate::middleware::auth_rate_limiter;
use crate::services::profile::MAX_AVATAR_BYTES;
use crate::state::AppState;

/// Room for the text fields and multipart framing around an avatar.
const PROFILE_FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the auth routes router.
///
/// Every request is rate limited per client IP.
pub fn auth_routes(rate_limit: RateLimitConfig) -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route_layer(auth_rate_limiter(rate_limit))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories/{id}", get(catalog::category))
        .route("/products", get(catalog::products))
        .route(
            "/products/{id}",
            get(catalog::product_detail).post(catalog::submit_interest),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/place",
            get(orders::place_order_page).post(orders::place_order),
        )
        .route("/mine", get(orders::my_orders))
}

/// Create all routes for the storefront.
pub fn routes(rate_limit: RateLimitConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/about", get(home::about))
        .merge(catalog_routes())
        .nest("/orders", order_routes())
        .merge(auth_routes(rate_limit))
        .route("/logout", get(auth::logout))
        .route(
            "/profile",
            get(profile::profile_page)
                .post(profile::update_profile)
                .layer(DefaultBodyLimit::max(
                    MAX_AVATAR_BYTES + PROFILE_FORM_OVERHEAD_BYTES,
                )),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::{SentryConfig, StorefrontConfig};
    use crate::middleware::session;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/windsor_goods_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            media_dir: PathBuf::from("media"),
            static_dir: PathBuf::from("static"),
            rate_limit: RateLimitConfig::default(),
            sentry: SentryConfig::default(),
        }
    }

    /// Router over a lazy pool: only handlers that never reach the
    /// database may be exercised.
    fn app() -> Router {
        app_with(test_config())
    }

    fn app_with(config: StorefrontConfig) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/windsor_goods_test")
            .unwrap();
        let session_layer = session::configure(MemoryStore::default(), &config);
        routes(config.rate_limit)
            .layer(session_layer)
            .with_state(AppState::new(config, pool))
    }

    /// Attach the peer address the server would record for the connection.
    fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    fn get_request(uri: &str) -> Request<Body> {
        from_peer(
            Request::builder().uri(uri).body(Body::empty()).unwrap(),
            "203.0.113.7:40000",
        )
    }

    /// Statuses of `count` login page requests through one router, each
    /// claiming a different forwarded address.
    async fn login_statuses(app: Router, count: u8) -> Vec<StatusCode> {
        let mut statuses = Vec::new();
        for i in 0..count {
            let request = Request::builder()
                .uri("/login")
                .header("x-forwarded-for", format!("198.51.100.{i}"))
                .body(Body::empty())
                .unwrap();
            let response = app
                .clone()
                .oneshot(from_peer(request, "203.0.113.9:40000"))
                .await
                .unwrap();
            statuses.push(response.status());
        }
        statuses
    }

    #[tokio::test]
    async fn test_protected_pages_redirect_to_login() {
        for uri in ["/orders/mine", "/orders/place", "/profile", "/products/1", "/logout"] {
            let response = app().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(response.headers()[header::LOCATION], "/login", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_about_sets_visit_cookie() {
        let request = Request::builder()
            .uri("/about")
            .header(header::COOKIE, "about_visits=2")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("about_visits="))
            .unwrap();
        assert!(cookie.starts_with("about_visits=3"));
        assert!(cookie.contains("Max-Age=300"));
    }

    #[tokio::test]
    async fn test_login_page_renders() {
        let response = app().oneshot(get_request("/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_registration_is_rerendered() {
        let request = from_peer(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "first_name=Ada&last_name=Lovelace&username=ada&email=ada%40example.com\
                     &password1=correct-horse&password2=battery-staple",
                ))
                .unwrap(),
            "203.0.113.8:40000",
        );
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("password fields didn"));
    }

    #[tokio::test]
    async fn test_login_limit_ignores_rotated_forwarded_for() {
        let statuses = login_statuses(app(), 8).await;

        let (allowed, throttled) = statuses.split_at(5);
        assert!(allowed.iter().all(|s| *s == StatusCode::OK), "{statuses:?}");
        assert!(
            throttled.iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS),
            "{statuses:?}"
        );
    }

    #[tokio::test]
    async fn test_login_limit_keys_on_forwarded_for_behind_proxy() {
        let mut config = test_config();
        config.rate_limit = RateLimitConfig {
            trust_proxy: true,
            ..RateLimitConfig::default()
        };

        let statuses = login_statuses(app_with(config), 8).await;

        assert!(statuses.iter().all(|s| *s == StatusCode::OK), "{statuses:?}");
    }
}
