//! Integration tests for ordering against stock, order history and the
//! catalog pages.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (wg-cli migrate)
//! - The storefront running against it (cargo run -p windsor-goods-storefront)
//!
//! Run with: cargo test -p windsor-goods-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use sqlx::PgPool;

use windsor_goods_core::{ClientId, ProductId};
use windsor_goods_integration_tests::{browser, create_product, logged_in_browser, page, pool, url};
use windsor_goods_storefront::db::{ClientRepository, ProductRepository, UserRepository};

/// The client record created for a registered username.
async fn client_id_for(pool: &PgPool, username: &str) -> ClientId {
    let user = UserRepository::new(pool)
        .get_by_username(username)
        .await
        .unwrap()
        .unwrap();
    ClientRepository::new(pool)
        .get_by_user(user.id)
        .await
        .unwrap()
        .unwrap()
        .id
}

async fn stock_of(pool: &PgPool, id: ProductId) -> u32 {
    ProductRepository::new(pool)
        .get(id)
        .await
        .unwrap()
        .unwrap()
        .stock
        .units()
}

async fn order(client: &Client, client_id: ClientId, product_id: ProductId, units: u32) -> String {
    let resp = client
        .post(url("/orders/place"))
        .form(&[
            ("client", client_id.to_string()),
            ("product", product_id.to_string()),
            ("num_units", units.to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.text().await.unwrap()
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_order_within_stock_is_placed() {
    let pool = pool().await;
    let (client, account) = logged_in_browser().await;
    let client_id = client_id_for(&pool, &account.username).await;
    let (product_id, _) = create_product(&pool, 10).await;

    let body = order(&client, client_id, product_id, 4).await;

    assert!(body.contains("Your order has been placed successfully."));
    assert_eq!(stock_of(&pool, product_id).await, 6);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_order_for_exact_stock_empties_it() {
    let pool = pool().await;
    let (client, account) = logged_in_browser().await;
    let client_id = client_id_for(&pool, &account.username).await;
    let (product_id, _) = create_product(&pool, 3).await;

    let body = order(&client, client_id, product_id, 3).await;

    assert!(body.contains("Your order has been placed successfully."));
    assert_eq!(stock_of(&pool, product_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_order_beyond_stock_is_refused() {
    let pool = pool().await;
    let (client, account) = logged_in_browser().await;
    let client_id = client_id_for(&pool, &account.username).await;
    let (product_id, _) = create_product(&pool, 2).await;

    let body = order(&client, client_id, product_id, 5).await;

    assert!(body.contains("We do not have sufficient stock to fill your order !!!"));
    assert_eq!(stock_of(&pool, product_id).await, 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_order_with_zero_units_is_a_form_error() {
    let pool = pool().await;
    let (client, account) = logged_in_browser().await;
    let client_id = client_id_for(&pool, &account.username).await;
    let (product_id, _) = create_product(&pool, 5).await;

    let body = order(&client, client_id, product_id, 0).await;

    assert!(body.contains("Ensure this value is greater than or equal to 1."));
    assert_eq!(stock_of(&pool, product_id).await, 5);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_history_lists_distinct_products() {
    let pool = pool().await;
    let (client, account) = logged_in_browser().await;
    let client_id = client_id_for(&pool, &account.username).await;
    let (first_id, first_name) = create_product(&pool, 50).await;
    let (second_id, second_name) = create_product(&pool, 50).await;

    order(&client, client_id, first_id, 1).await;
    order(&client, client_id, first_id, 2).await;
    order(&client, client_id, second_id, 1).await;

    let (status, body) = page(&client, "/orders/mine").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("Orders placed by {} :-", account.display_name())));
    assert_eq!(body.matches(&first_name).count(), 1);
    assert_eq!(body.matches(&second_name).count(), 1);
    // One row per order: 2 units at $12.50, and two single units
    assert!(body.contains("$25.00"));
    assert_eq!(body.matches("$12.50").count(), 2);
    assert_eq!(body.matches("Order Placed").count(), 3);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_history_without_client_record() {
    let pool = pool().await;
    let (client, account) = logged_in_browser().await;
    let client_id = client_id_for(&pool, &account.username).await;

    sqlx::query("DELETE FROM storefront.client WHERE id = $1")
        .bind(client_id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = page(&client, "/orders/mine").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("You are not a registered client"));
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_interest_yes_increments_counter() {
    let pool = pool().await;
    let (client, _account) = logged_in_browser().await;
    let (product_id, _) = create_product(&pool, 5).await;

    let resp = client
        .post(url(&format!("/products/{product_id}")))
        .form(&[("interested", "1"), ("quantity", "2"), ("comments", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");

    let product = ProductRepository::new(&pool)
        .get(product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.interested, 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_interest_no_leaves_counter() {
    let pool = pool().await;
    let (client, _account) = logged_in_browser().await;
    let (product_id, _) = create_product(&pool, 5).await;

    let resp = client
        .post(url(&format!("/products/{product_id}")))
        .form(&[("interested", "0"), ("quantity", "1"), ("comments", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let product = ProductRepository::new(&pool)
        .get(product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.interested, 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_category_is_not_found() {
    let (status, _) = page(&browser(), "/categories/2147483647").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_about_counts_visits() {
    let client = browser();

    let (_, first) = page(&client, "/about").await;
    let (_, second) = page(&client, "/about").await;

    assert!(first.contains("visited this page 1 time."));
    assert!(second.contains("visited this page 2 times."));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health_endpoints() {
    let client = browser();
    let (status, body) = page(&client, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = page(&client, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}
