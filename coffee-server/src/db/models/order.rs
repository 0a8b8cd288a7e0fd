//! Order Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::OrderStatus;
use surrealdb::RecordId;

pub type OrderId = RecordId;

/// Priced line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: u32,
    /// price × quantity
    pub amount: f64,
    /// amount × discount% / 100
    pub discount: f64,
}

/// Persisted order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<OrderId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub total_discount: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}
