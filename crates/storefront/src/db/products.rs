//! Product repository: catalog reads, interest counter and stock refills.

use rust_decimal::Decimal;
use sqlx::PgPool;

use windsor_goods_core::{CategoryId, Price, ProductId, Stock};

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, description, price, stock, available, interested";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    category_id: i32,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    available: bool,
    interested: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(r.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", r.id))
        })?;
        let stock = Stock::try_from(r.stock).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stock for product {}: {e}", r.id))
        })?;

        Ok(Self {
            id: ProductId::new(r.id),
            category_id: CategoryId::new(r.category_id),
            name: r.name,
            description: r.description,
            price,
            stock,
            available: r.available,
            interested: r.interested,
        })
    }
}

/// Fields for inserting or updating a product by name.
pub struct ProductUpsert<'a> {
    pub category_id: CategoryId,
    pub name: &'a str,
    pub description: &'a str,
    pub price: Price,
    pub stock: Stock,
    pub available: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The first `limit` products by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product ORDER BY id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Every product, by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// All products in a category, by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE category_id = $1 ORDER BY id"
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Count one more visitor interested in a product and return the new
    /// counter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn increment_interest(&self, id: ProductId) -> Result<i32, RepositoryError> {
        let counter: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE storefront.product
            SET interested = interested + 1
            WHERE id = $1
            RETURNING interested
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        counter.ok_or(RepositoryError::NotFound)
    }

    /// Add `amount` units to a product's stock.
    ///
    /// The row is locked while the new level is checked against capacity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the refill would exceed capacity;
    /// stock is left unchanged.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn refill(&self, id: ProductId, amount: u32) -> Result<Stock, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i32> = sqlx::query_scalar(
            r"SELECT stock FROM storefront.product WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let current = current.ok_or(RepositoryError::NotFound)?;
        let current = Stock::try_from(current).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stock for product {id}: {e}"))
        })?;

        let refilled = current
            .refill(amount)
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;

        sqlx::query(r"UPDATE storefront.product SET stock = $2 WHERE id = $1")
            .bind(id)
            .bind(refilled.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(refilled)
    }

    /// Insert a product, or update it when a product with the same name
    /// exists in the category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn upsert(&self, product: ProductUpsert<'_>) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO storefront.product
                (category_id, name, description, price, stock, available)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (category_id, name) DO UPDATE SET
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                stock = EXCLUDED.stock,
                available = EXCLUDED.available
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(product.category_id)
        .bind(product.name)
        .bind(product.description)
        .bind(product.price.amount())
        .bind(product.stock.as_i32())
        .bind(product.available)
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }
}
