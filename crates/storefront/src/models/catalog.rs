//! Categories and products.

use serde::Serialize;

use windsor_goods_core::{CategoryId, Price, ProductId, Stock};

/// A product category stocked at one warehouse.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub warehouse: String,
}

/// A product for sale.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: Stock,
    pub available: bool,
    /// Number of "yes" interest submissions.
    pub interested: i32,
}

impl Product {
    /// Whether the product can currently be ordered at all.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.available && self.stock.units() > 0
    }
}
