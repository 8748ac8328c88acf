//! Integration tests for registration, login, logout and the profile page.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (wg-cli migrate)
//! - The storefront running against it (cargo run -p windsor-goods-storefront)
//!
//! Run with: cargo test -p windsor-goods-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use chrono::{TimeDelta, Utc};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tower_sessions::SessionStore;
use tower_sessions::session::Id;
use tower_sessions_sqlx_store::PostgresStore;

use windsor_goods_core::LoginGate;
use windsor_goods_core::login_gate::{EXPIRED_MESSAGE, LOGGED_OUT_TEXT};
use windsor_goods_integration_tests::{
    Account, SESSION_COOKIE, browser, browser_with_jar, cookie_value, log_in, logged_in_browser,
    page, pool, register, url,
};
use windsor_goods_storefront::db::UserRepository;
use windsor_goods_storefront::models::session_keys;

// ============================================================================
// Registration and Login
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_register_then_login_lands_on_order_history() {
    let (client, account) = logged_in_browser().await;

    let (status, body) = page(&client, "/orders/mine").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!(
        "{} has not placed any orders",
        account.display_name()
    )));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_duplicate_username_is_rejected() {
    let client = browser();
    let account = Account::new();
    register(&client, &account).await;

    let email = format!("other-{}@example.com", account.username);
    let resp = client
        .post(url("/register"))
        .form(&[
            ("first_name", "Other"),
            ("last_name", "Person"),
            ("username", account.username.as_str()),
            ("email", email.as_str()),
            ("password1", "another-password"),
            ("password2", "another-password"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("A user with that username already exists."));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_wrong_password_is_refused() {
    let client = browser();
    let account = Account::new();
    register(&client, &account).await;

    let wrong = Account {
        password: "not-the-password".to_string(),
        ..account
    };
    let resp = log_in(&client, &wrong).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid login details."));

    let (status, _) = page(&client, "/orders/mine").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_disabled_account_is_refused() {
    let client = browser();
    let account = Account::new();
    register(&client, &account).await;

    let pool = pool().await;
    UserRepository::new(&pool)
        .set_active(&account.username, false)
        .await
        .unwrap();

    let resp = log_in(&client, &account).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Your account is disabled."));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_logout_ends_the_session() {
    let (client, _account) = logged_in_browser().await;

    let resp = client.get(url("/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/login");

    let (status, _) = page(&client, "/orders/mine").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_index_shows_login_time_only_when_logged_in() {
    let (status, body) = page(&browser(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("You are logged out"));

    let (client, _account) = logged_in_browser().await;
    let (status, body) = page(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("You are logged out"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_login_older_than_an_hour_is_ended_on_index() {
    let (client, jar) = browser_with_jar();
    let account = Account::new();
    register(&client, &account).await;
    assert_eq!(log_in(&client, &account).await.status(), StatusCode::SEE_OTHER);

    // Back-date the login recorded in the stored session
    let session_id: Id = cookie_value(&jar, SESSION_COOKIE)
        .unwrap()
        .parse()
        .unwrap();
    let store = PostgresStore::new(pool().await);
    let mut record = store.load(&session_id).await.unwrap().unwrap();
    let two_hours_ago = Utc::now().naive_utc() - TimeDelta::hours(2);
    record.data.insert(
        session_keys::LAST_LOGIN.to_owned(),
        serde_json::Value::from(LoginGate::stamp(two_hours_ago)),
    );
    store.save(&record).await.unwrap();

    let (status, body) = page(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(EXPIRED_MESSAGE));
    assert!(body.contains(LOGGED_OUT_TEXT));
    assert!(!body.contains(&account.username));

    assert!(store.load(&session_id).await.unwrap().is_none());
    let (status, _) = page(&client, "/orders/mine").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

// ============================================================================
// Profile
// ============================================================================

/// A PNG signature followed by filler; only the leading bytes are inspected.
fn tiny_png() -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&[0; 32]);
    bytes
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_profile_update_with_avatar() {
    let (client, account) = logged_in_browser().await;

    let (status, body) = page(&client, "/profile").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/static/images/default-avatar.svg"));

    let form = Form::new()
        .text("first_name", account.first_name.clone())
        .text("last_name", "Renamed")
        .text("email", format!("{}@example.org", account.username))
        .text("bio", "Buys hammers.")
        .part(
            "avatar",
            Part::bytes(tiny_png()).file_name("me.png").mime_str("image/png").unwrap(),
        );
    let resp = client.post(url("/profile")).multipart(form).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let (_, body) = page(&client, "/profile").await;
    assert!(body.contains("Renamed"));
    assert!(body.contains("Buys hammers."));
    assert!(body.contains("/media/profile_images/"));
}

/// The uploaded avatar URL shown on the profile page.
async fn avatar_url(client: &reqwest::Client) -> String {
    let (_, body) = page(client, "/profile").await;
    let (_, rest) = body.split_once("/media/profile_images/").unwrap();
    let (name, _) = rest.split_once('"').unwrap();
    format!("/media/profile_images/{name}")
}

async fn upload_avatar(client: &reqwest::Client, account: &Account) {
    let form = Form::new()
        .text("first_name", account.first_name.clone())
        .text("last_name", account.last_name.clone())
        .text("email", format!("{}@example.com", account.username))
        .text("bio", "")
        .part(
            "avatar",
            Part::bytes(tiny_png()).file_name("me.png").mime_str("image/png").unwrap(),
        );
    let resp = client.post(url("/profile")).multipart(form).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_replaced_avatar_is_deleted() {
    let (client, account) = logged_in_browser().await;

    upload_avatar(&client, &account).await;
    let first = avatar_url(&client).await;
    assert_eq!(page(&client, &first).await.0, StatusCode::OK);

    upload_avatar(&client, &account).await;
    let second = avatar_url(&client).await;
    assert_ne!(first, second);
    assert_eq!(page(&client, &second).await.0, StatusCode::OK);
    assert_eq!(page(&client, &first).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_profile_rejects_non_image_avatar() {
    let (client, account) = logged_in_browser().await;

    let form = Form::new()
        .text("first_name", account.first_name.clone())
        .text("last_name", account.last_name.clone())
        .text("email", format!("{}@example.com", account.username))
        .text("bio", "")
        .part(
            "avatar",
            Part::bytes(b"not an image".to_vec()).file_name("notes.txt"),
        );
    let resp = client.post(url("/profile")).multipart(form).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("field-error"));
    assert!(body.contains("/static/images/default-avatar.svg"));
}
