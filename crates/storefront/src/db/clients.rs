//! Client repository.

use sqlx::PgPool;

use windsor_goods_core::{CategoryId, ClientId, Province, UserId};

use super::RepositoryError;
use crate::models::{Category, Client};

const CLIENT_SELECT: &str = r"
    SELECT c.id, c.user_id, u.username, u.first_name, u.last_name,
           c.company, c.shipping_address, c.city, c.province
    FROM storefront.client c
    JOIN storefront.app_user u ON u.id = c.user_id
";

#[derive(sqlx::FromRow)]
struct ClientRow {
    id: i32,
    user_id: i32,
    username: String,
    first_name: String,
    last_name: String,
    company: String,
    shipping_address: Option<String>,
    city: String,
    province: String,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(r: ClientRow) -> Result<Self, Self::Error> {
        let province: Province = r.province.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid province for client {}: {e}", r.id))
        })?;

        Ok(Self {
            id: ClientId::new(r.id),
            user_id: UserId::new(r.user_id),
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
            company: r.company,
            shipping_address: r.shipping_address,
            city: r.city,
            province,
        })
    }
}

/// Shipping details set on a client by management tooling.
pub struct ClientDetails<'a> {
    pub company: &'a str,
    pub shipping_address: Option<&'a str>,
    pub city: &'a str,
    pub province: Province,
}

#[derive(sqlx::FromRow)]
struct InterestRow {
    id: i32,
    name: String,
    warehouse: String,
}

/// Repository for client database operations.
pub struct ClientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientRepository<'a> {
    /// Create a new client repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every client, by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!("{CLIENT_SELECT} ORDER BY c.id"))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Client::try_from).collect()
    }

    /// Get a client by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!("{CLIENT_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Client::try_from).transpose()
    }

    /// Get the client record attached to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Client>, RepositoryError> {
        let row =
            sqlx::query_as::<_, ClientRow>(&format!("{CLIENT_SELECT} WHERE c.user_id = $1"))
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        row.map(Client::try_from).transpose()
    }

    /// Categories a client is interested in, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn interests(&self, id: ClientId) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, InterestRow>(
            r"
            SELECT cat.id, cat.name, cat.warehouse
            FROM storefront.client_interest ci
            JOIN storefront.category cat ON cat.id = ci.category_id
            WHERE ci.client_id = $1
            ORDER BY cat.name
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: CategoryId::new(r.id),
                name: r.name,
                warehouse: r.warehouse,
            })
            .collect())
    }

    /// Mark a client as interested in a category. Repeating is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_interest(
        &self,
        id: ClientId,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.client_interest (client_id, category_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(id)
        .bind(category_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Replace a client's shipping details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_details(
        &self,
        id: ClientId,
        details: ClientDetails<'_>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.client
            SET company = $2, shipping_address = $3, city = $4, province = $5
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(details.company)
        .bind(details.shipping_address)
        .bind(details.city)
        .bind(details.province.code())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
