//! Order request payloads

use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Rejected,
    Paid,
}

/// One `(productId, quantity)` pair submitted at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    /// Product id, either `product:<key>` or the bare key
    pub product: String,
    pub quantity: u32,
}

/// `POST /products/orders` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineInput>,
}
