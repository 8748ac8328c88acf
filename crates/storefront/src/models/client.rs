//! Clients: users who can place orders.

use serde::Serialize;

use windsor_goods_core::{ClientId, Province, UserId};

/// A client record attached to a site user.
#[derive(Debug, Clone, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub shipping_address: Option<String>,
    pub city: String,
    pub province: Province,
}

impl Client {
    /// Display name used in order history messages.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
