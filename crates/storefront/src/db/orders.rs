//! Order repository.
//!
//! Placing an order is the one write path that touches two tables: the order
//! insert and the stock decrement commit together, with the product row
//! locked for the duration so concurrent orders against the same product
//! serialize.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use windsor_goods_core::{
    ClientId, OrderId, OrderStatus, Price, ProductId, Reservation, Stock, StockError,
};
use windsor_goods_core::ledger::{INSUFFICIENT_STOCK_MESSAGE, ORDER_PLACED_MESSAGE};

use super::RepositoryError;
use crate::models::Order;

/// Outcome of an order attempt that reached the stock check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Order stored and stock decremented.
    Accepted {
        order_id: OrderId,
        reservation: Reservation,
    },
    /// Stock rule refused the order; nothing was written.
    Rejected(StockError),
}

impl Placement {
    /// Message shown to the visitor.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => ORDER_PLACED_MESSAGE,
            Self::Rejected(_) => INSUFFICIENT_STOCK_MESSAGE,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    product_id: i32,
    product_name: String,
    client_id: i32,
    num_units: i32,
    order_status: i16,
    status_date: NaiveDate,
    price: Decimal,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_code(r.order_status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "invalid status {} for order {}",
                r.order_status, r.id
            ))
        })?;
        let num_units = u32::try_from(r.num_units).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid unit count {} for order {}",
                r.num_units, r.id
            ))
        })?;
        let unit_price = Price::new(r.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for order {}: {e}", r.id))
        })?;

        Ok(Self {
            id: OrderId::new(r.id),
            product_id: ProductId::new(r.product_id),
            product_name: r.product_name,
            client_id: ClientId::new(r.client_id),
            num_units,
            status,
            status_date: r.status_date,
            unit_price,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order if stock covers it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::DataCorruption` if the stored stock is invalid.
    /// Returns `RepositoryError::Database` for other database errors, including
    /// a client id that does not exist.
    pub async fn place(
        &self,
        client_id: ClientId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Placement, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i32> = sqlx::query_scalar(
            r"SELECT stock FROM storefront.product WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let current = current.ok_or(RepositoryError::NotFound)?;
        let stock = Stock::try_from(current).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stock for product {product_id}: {e}"))
        })?;

        let reservation = match stock.reserve(quantity) {
            Ok(reservation) => reservation,
            Err(e) => {
                tx.rollback().await?;
                return Ok(Placement::Rejected(e));
            }
        };

        let num_units = i32::try_from(quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("quantity {quantity} out of range"))
        })?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO storefront.customer_order (product_id, client_id, num_units, order_status)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(product_id)
        .bind(client_id)
        .bind(num_units)
        .bind(OrderStatus::Placed.code())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(r"UPDATE storefront.product SET stock = $2 WHERE id = $1")
            .bind(product_id)
            .bind(reservation.after.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Placement::Accepted {
            order_id: OrderId::new(order_id),
            reservation,
        })
    }

    /// All orders for a client, by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_client(&self, client_id: ClientId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT o.id, o.product_id, p.name AS product_name, o.client_id,
                   o.num_units, o.order_status, o.status_date, p.price
            FROM storefront.customer_order o
            JOIN storefront.product p ON p.id = o.product_id
            WHERE o.client_id = $1
            ORDER BY o.id
            ",
        )
        .bind(client_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_messages() {
        let placed = Placement::Accepted {
            order_id: OrderId::new(1),
            reservation: Stock::new(10).unwrap().reserve(5).unwrap(),
        };
        assert_eq!(placed.message(), "Your order has been placed successfully.");

        let refused = Placement::Rejected(Stock::new(5).unwrap().reserve(6).unwrap_err());
        assert_eq!(
            refused.message(),
            "We do not have sufficient stock to fill your order !!!"
        );
    }
}
