//! CLI command implementations.

pub mod client;
pub mod migrate;
pub mod seed;
pub mod stock;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors raised while connecting to the storefront database.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Neither database URL variable is set.
    #[error("Missing environment variable: STOREFRONT_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// The connection attempt failed.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the storefront database named by the environment.
///
/// Loads `.env` if present and reads `STOREFRONT_DATABASE_URL`, falling back
/// to `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConnectError` if no URL is configured or the connection fails.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to storefront database...");
    Ok(windsor_goods_storefront::db::create_pool(&database_url).await?)
}
