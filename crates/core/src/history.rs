//! Order history summaries for the "my orders" page.

/// Message shown when the logged-in user has no client record.
pub const NOT_A_CLIENT_MESSAGE: &str = "You are not a registered client";

/// Summary of a client's orders: a headline plus the distinct product names
/// ordered, in the order they were first ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHistory {
    /// Headline message.
    pub message: String,
    /// Distinct product names, first occurrence wins.
    pub products: Vec<String>,
}

impl OrderHistory {
    /// Summarize orders for a client.
    ///
    /// `product_names` holds one entry per order (so duplicates are expected)
    /// in order-id order.
    pub fn summarize<I, S>(client_name: &str, product_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut products: Vec<String> = Vec::new();
        let mut order_count = 0_usize;
        for name in product_names {
            order_count += 1;
            let name = name.into();
            if !products.contains(&name) {
                products.push(name);
            }
        }

        let message = if order_count == 0 {
            format!("{client_name} has not placed any orders")
        } else {
            format!("Orders placed by {client_name} :-")
        };

        Self { message, products }
    }

    /// Summary for a user without a client record.
    #[must_use]
    pub fn not_a_client() -> Self {
        Self {
            message: NOT_A_CLIENT_MESSAGE.to_owned(),
            products: Vec::new(),
        }
    }
}
