//! Customer orders.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use windsor_goods_core::{ClientId, OrderId, OrderStatus, Price, ProductId};

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub client_id: ClientId,
    pub num_units: u32,
    pub status: OrderStatus,
    pub status_date: NaiveDate,
    /// Unit price at the time the order was read.
    pub unit_price: Price,
}

impl Order {
    /// Unit price times quantity.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.unit_price.times(self.num_units)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cost() {
        let order = Order {
            id: OrderId::new(1),
            product_id: ProductId::new(2),
            product_name: "Mug".to_owned(),
            client_id: ClientId::new(3),
            num_units: 4,
            status: OrderStatus::Placed,
            status_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            unit_price: Price::parse("2.50").unwrap(),
        };
        assert_eq!(order.total_cost(), Decimal::new(1000, 2));
    }
}
