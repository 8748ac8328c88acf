//! Integration tests for Windsor Goods.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the storefront against a test database.
//! # Every test logs in from the same address, so raise the login burst.
//! wg-cli migrate
//! STOREFRONT_AUTH_RATE_BURST=10000 cargo run -p windsor-goods-storefront
//!
//! # Run the ignored integration tests
//! cargo test -p windsor-goods-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Running storefront (default: `http://localhost:3000`)
//! - `STOREFRONT_DATABASE_URL` - The same database, used for fixtures
//!
//! Each test creates its own users and products under unique names, so tests
//! may run concurrently against one database.

#![allow(
    clippy::missing_panics_doc,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, StatusCode, Url, redirect};
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use windsor_goods_core::{Price, ProductId, Stock};
use windsor_goods_storefront::db::{CategoryRepository, ProductRepository, ProductUpsert};

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Build an absolute URL for a storefront path.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A short unique suffix for names created by a test.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..12])
}

/// Session cookie set by the storefront.
pub const SESSION_COOKIE: &str = "wg_session";

/// HTTP client with a cookie store that does not follow redirects.
#[must_use]
pub fn browser() -> Client {
    browser_with_jar().0
}

/// Like [`browser`], also returning the cookie jar so tests can read the
/// session cookie.
#[must_use]
pub fn browser_with_jar() -> (Client, Arc<Jar>) {
    let jar = Arc::new(Jar::default());
    let client = Client::builder()
        .cookie_provider(Arc::clone(&jar))
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client");
    (client, jar)
}

/// Value of a cookie the jar would send to the storefront.
#[must_use]
pub fn cookie_value(jar: &Jar, name: &str) -> Option<String> {
    let base = Url::parse(&base_url()).expect("STOREFRONT_BASE_URL is a valid URL");
    let header = jar.cookies(&base)?;
    header
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}

/// Connect to the storefront database for fixtures.
pub async fn pool() -> PgPool {
    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set for integration tests");

    windsor_goods_storefront::db::create_pool(&SecretString::from(database_url))
        .await
        .expect("Failed to connect to storefront database")
}

/// Credentials of an account created by [`register`].
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Account {
    /// A fresh account with a unique username.
    #[must_use]
    pub fn new() -> Self {
        Self {
            username: unique("user"),
            password: "correct-horse-battery".to_string(),
            first_name: "Test".to_string(),
            last_name: unique("Client"),
        }
    }

    /// Name shown in order history messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

/// Register an account through the registration form.
pub async fn register(client: &Client, account: &Account) {
    let email = format!("{}@example.com", account.username);
    let resp = client
        .post(url("/register"))
        .form(&[
            ("first_name", account.first_name.as_str()),
            ("last_name", account.last_name.as_str()),
            ("username", account.username.as_str()),
            ("email", email.as_str()),
            ("password1", account.password.as_str()),
            ("password2", account.password.as_str()),
        ])
        .send()
        .await
        .expect("Failed to submit registration");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "registration failed");
}

/// Log in through the login form.
pub async fn log_in(client: &Client, account: &Account) -> reqwest::Response {
    client
        .post(url("/login"))
        .form(&[
            ("username", account.username.as_str()),
            ("password", account.password.as_str()),
        ])
        .send()
        .await
        .expect("Failed to submit login")
}

/// Register a fresh account and log in as it.
pub async fn logged_in_browser() -> (Client, Account) {
    let client = browser();
    let account = Account::new();
    register(&client, &account).await;

    let resp = log_in(&client, &account).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login failed");

    (client, account)
}

/// Create a product with a known stock level in its own category.
pub async fn create_product(pool: &PgPool, stock: u32) -> (ProductId, String) {
    let category = CategoryRepository::new(pool)
        .upsert(&unique("Category "), "Windsor")
        .await
        .expect("Failed to create category");

    let name = unique("Product ");
    let product = ProductRepository::new(pool)
        .upsert(ProductUpsert {
            category_id: category.id,
            name: &name,
            description: "Integration test product",
            price: Price::parse("12.50").expect("valid price"),
            stock: Stock::new(i64::from(stock)).expect("valid stock"),
            available: true,
        })
        .await
        .expect("Failed to create product");

    (product.id, name)
}

/// Fetch a page and return its body.
pub async fn page(client: &Client, path: &str) -> (StatusCode, String) {
    let resp = client
        .get(url(path))
        .send()
        .await
        .expect("Failed to fetch page");
    let status = resp.status();
    let body = resp.text().await.expect("Failed to read body");
    (status, body)
}
