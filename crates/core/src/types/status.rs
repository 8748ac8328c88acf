//! Fixed-choice enums: order status and client province.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Stored as a `SMALLINT` code: 0 cancelled, 1 placed, 2 shipped, 3 delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Cancelled,
    #[default]
    Placed,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// All statuses in code order.
    pub const ALL: [Self; 4] = [Self::Cancelled, Self::Placed, Self::Shipped, Self::Delivered];

    /// Numeric database code.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Cancelled => 0,
            Self::Placed => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
        }
    }

    /// Look up a status by its numeric code.
    #[must_use]
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Cancelled),
            1 => Some(Self::Placed),
            2 => Some(Self::Shipped),
            3 => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Human-readable label shown to customers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cancelled => "Order Cancelled",
            Self::Placed => "Order Placed",
            Self::Shipped => "Order Shipped",
            Self::Delivered => "Order Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Province a client ships to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Province {
    #[serde(rename = "AB")]
    Alberta,
    #[serde(rename = "MB")]
    Manitoba,
    #[default]
    #[serde(rename = "ON")]
    Ontario,
    #[serde(rename = "QC")]
    Quebec,
}

impl Province {
    /// All provinces in display order.
    pub const ALL: [Self; 4] = [Self::Alberta, Self::Manitoba, Self::Ontario, Self::Quebec];

    /// Two-letter code stored in the database.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Alberta => "AB",
            Self::Manitoba => "MB",
            Self::Ontario => "ON",
            Self::Quebec => "QC",
        }
    }

    /// Full province name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alberta => "Alberta",
            Self::Manitoba => "Manitoba",
            Self::Ontario => "Ontario",
            Self::Quebec => "Quebec",
        }
    }
}

impl std::fmt::Display for Province {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Province {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid province: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_codes_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(OrderStatus::from_code(4), None);
        assert_eq!(OrderStatus::from_code(-1), None);
    }

    #[test]
    fn test_order_status_default_is_placed() {
        assert_eq!(OrderStatus::default(), OrderStatus::Placed);
        assert_eq!(OrderStatus::default().to_string(), "Order Placed");
    }

    #[test]
    fn test_province_parse() {
        assert_eq!("on".parse::<Province>().unwrap(), Province::Ontario);
        assert_eq!("QC".parse::<Province>().unwrap(), Province::Quebec);
        assert!("BC".parse::<Province>().is_err());
    }

    #[test]
    fn test_province_default_is_ontario() {
        assert_eq!(Province::default().code(), "ON");
    }

    #[test]
    fn test_province_serde_uses_codes() {
        let json = serde_json::to_string(&Province::Manitoba).unwrap();
        assert_eq!(json, "\"MB\"");
    }
}
