//! Stock management commands.
//!
//! # Usage
//!
//! ```bash
//! # Add 50 units to each listed product
//! wg-cli stock increase 1 2 3
//!
//! # Add 100 units to one product
//! wg-cli stock refill 4
//! ```
//!
//! A product whose stock would pass the warehouse capacity is left unchanged
//! and reported; the remaining products are still processed.

use thiserror::Error;

use windsor_goods_core::{ProductId, Stock};
use windsor_goods_storefront::db::{ProductRepository, RepositoryError};

use super::ConnectError;

/// Errors that can occur while changing stock.
#[derive(Debug, Error)]
pub enum StockCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("{failed} of {total} products were not updated")]
    Incomplete { failed: usize, total: usize },

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Add [`Stock::INCREASE_STEP`] units to each product.
///
/// # Errors
///
/// Returns `StockCommandError::Incomplete` if any product could not be
/// updated, after attempting all of them.
pub async fn increase(ids: &[ProductId]) -> Result<(), StockCommandError> {
    let pool = super::connect().await?;
    let products = ProductRepository::new(&pool);

    let mut failed = 0;
    for &id in ids {
        match add_units(&products, id, Stock::INCREASE_STEP).await {
            Ok(stock) => tracing::info!(product_id = %id, stock = %stock, "Stock increased"),
            Err(e) => {
                tracing::error!(product_id = %id, "Stock not increased: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(StockCommandError::Incomplete {
            failed,
            total: ids.len(),
        });
    }
    Ok(())
}

/// Add [`Stock::REFILL_STEP`] units to one product.
///
/// # Errors
///
/// Returns `StockCommandError` if the product doesn't exist or the refill
/// would exceed capacity.
pub async fn refill(id: ProductId) -> Result<(), StockCommandError> {
    let pool = super::connect().await?;
    let stock = add_units(&ProductRepository::new(&pool), id, Stock::REFILL_STEP).await?;
    tracing::info!(product_id = %id, stock = %stock, "Stock refilled");
    Ok(())
}

async fn add_units(
    products: &ProductRepository<'_>,
    id: ProductId,
    amount: u32,
) -> Result<Stock, StockCommandError> {
    products.refill(id, amount).await.map_err(|e| match e {
        RepositoryError::NotFound => StockCommandError::ProductNotFound(id),
        other => StockCommandError::Repository(other),
    })
}
