//! Order placement and order history.

use sqlx::PgPool;
use thiserror::Error;

use windsor_goods_core::forms::OrderInput;
use windsor_goods_core::{OrderHistory, UserId};

use crate::db::{ClientRepository, OrderRepository, Placement, RepositoryError};
use crate::models::Order;

/// Errors that can occur while placing or listing orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The selected client does not exist.
    #[error("client not found")]
    ClientNotFound,

    /// The selected product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order history of the client attached to a user.
#[derive(Debug, Clone)]
pub struct ClientHistory {
    /// Headline and distinct product names.
    pub summary: OrderHistory,
    /// Every order, oldest first.
    pub orders: Vec<Order>,
}

/// Order service.
pub struct OrderService<'a> {
    clients: ClientRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            clients: ClientRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order against the product's stock.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::ClientNotFound` or `OrderError::ProductNotFound`
    /// when a selected entity doesn't exist.
    /// Returns `OrderError::Repository` for database errors.
    pub async fn place(&self, input: &OrderInput) -> Result<Placement, OrderError> {
        if self.clients.get(input.client_id).await?.is_none() {
            return Err(OrderError::ClientNotFound);
        }

        let placement = self
            .orders
            .place(input.client_id, input.product_id, input.quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderError::ProductNotFound,
                other => OrderError::Repository(other),
            })?;

        match placement {
            Placement::Accepted {
                order_id,
                reservation,
            } => tracing::info!(
                order_id = %order_id,
                product_id = %input.product_id,
                client_id = %input.client_id,
                units = reservation.quantity,
                stock_after = %reservation.after,
                "Order placed"
            ),
            Placement::Rejected(ref e) => tracing::info!(
                product_id = %input.product_id,
                client_id = %input.client_id,
                reason = %e,
                "Order refused"
            ),
        }

        Ok(placement)
    }

    /// Summarize the orders of the client attached to a user.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` for database errors.
    pub async fn history(&self, user_id: UserId) -> Result<ClientHistory, OrderError> {
        let Some(client) = self.clients.get_by_user(user_id).await? else {
            return Ok(ClientHistory {
                summary: OrderHistory::not_a_client(),
                orders: Vec::new(),
            });
        };

        let orders = self.orders.list_for_client(client.id).await?;
        let summary = OrderHistory::summarize(
            &client.name(),
            orders.iter().map(|o| o.product_name.as_str()),
        );

        Ok(ClientHistory { summary, orders })
    }
}
