//! Product interest submissions.
//!
//! Visitors answer "are you interested in this product?" with yes or no. A
//! yes bumps the product's interest counter by exactly one; a no changes
//! nothing. The counter never goes down.

use serde::{Deserialize, Serialize};

/// Message shown when a product id does not exist.
pub const PRODUCT_NOT_FOUND_MESSAGE: &str =
    "The requested product does not exist. Please provide correct product id !!!";

/// A visitor's answer on the interest form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterestChoice {
    /// Submitted as `1`.
    Yes,
    /// Submitted as `0`.
    No,
}

impl InterestChoice {
    /// Parse the radio-button value (`"1"` or `"0"`).
    #[must_use]
    pub fn from_form_value(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(Self::Yes),
            "0" => Some(Self::No),
            _ => None,
        }
    }
}
