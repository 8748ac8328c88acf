//! Site user accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use windsor_goods_core::{Email, UserId, Username};

/// A registered site user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Disabled accounts cannot log in.
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// "First Last", falling back to the username when both are blank.
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.to_string()
        } else {
            name.to_owned()
        }
    }
}
