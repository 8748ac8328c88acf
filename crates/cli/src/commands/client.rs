//! Client listing command.
//!
//! # Usage
//!
//! ```bash
//! wg-cli client list
//! ```

use windsor_goods_storefront::db::{ClientRepository, RepositoryError};
use windsor_goods_storefront::models::Client;

use super::ConnectError;

/// Errors that can occur while listing clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Log every client with their location and categories of interest.
///
/// # Errors
///
/// Returns `ClientCommandError` if the database cannot be read.
pub async fn list() -> Result<(), ClientCommandError> {
    let pool = super::connect().await?;
    let clients = ClientRepository::new(&pool);

    let all = clients.list().await?;
    tracing::info!("Clients ({})", all.len());
    tracing::info!("===========");

    for client in &all {
        let interests = clients.interests(client.id).await?;
        let names: Vec<&str> = interests.iter().map(|c| c.name.as_str()).collect();
        tracing::info!("{}", describe(client, &names));
    }

    Ok(())
}

/// One-line summary of a client.
fn describe(client: &Client, interests: &[&str]) -> String {
    let company = if client.company.is_empty() {
        String::new()
    } else {
        format!(" [{}]", client.company)
    };
    let interests = if interests.is_empty() {
        "none".to_owned()
    } else {
        interests.join(", ")
    };

    format!(
        "#{} {} ({}){company}, {}, {}; interested in: {interests}",
        client.id,
        client.name(),
        client.username,
        client.city,
        client.province.code(),
    )
}
