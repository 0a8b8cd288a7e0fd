//! Order placement
//!
//! Every product is resolved before anything is written; the order is then
//! persisted with a single insert. A failure at any step leaves no order.

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::{CreateOrderRequest, OrderStatus};
use shared::util::now_millis;
use surrealdb::RecordId;

use crate::db::models::{Order, Product};
use crate::db::repository::product::PRODUCT_TABLE;
use crate::db::repository::{OrderRepository, ProductRepository, RepoError, parse_record_id};
use crate::pricing::{PricingLine, price_order};

/// Order placement service
#[derive(Clone)]
pub struct OrderService {
    products: ProductRepository,
    orders: OrderRepository,
}

impl OrderService {
    pub fn new(products: ProductRepository, orders: OrderRepository) -> Self {
        Self { products, orders }
    }

    /// Price and persist an order for `user_id`
    ///
    /// | Failure | Error |
    /// |---------|-------|
    /// | no items / zero quantity | `OrderEmpty` / `OrderInvalidQuantity` (400) |
    /// | malformed product id | `InvalidRequest` (400) |
    /// | unknown product | `ProductNotFound` (404) |
    /// | storage failure | `DatabaseError` (500) |
    pub async fn create_order(
        &self,
        user_id: &str,
        request: CreateOrderRequest,
    ) -> Result<Order, AppError> {
        if request.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let user: RecordId = user_id
            .parse()
            .map_err(|_| AppError::invalid_request(format!("Invalid user id: {user_id}")))?;

        let mut product_ids = Vec::with_capacity(request.items.len());
        for (index, line) in request.items.iter().enumerate() {
            let id = parse_record_id(PRODUCT_TABLE, &line.product).map_err(|_| {
                AppError::invalid_request(format!("Malformed product id: {}", line.product))
                    .with_detail("index", index)
            })?;
            product_ids.push(id);
        }

        let mut unique_ids = product_ids.clone();
        unique_ids.sort_by_key(|id| id.to_string());
        unique_ids.dedup();

        let resolved: HashMap<String, Product> = self
            .products
            .find_many(unique_ids)
            .await
            .map_err(storage_error)?
            .into_iter()
            .filter_map(|p| p.id.as_ref().map(|id| id.to_string()).map(|key| (key, p)))
            .collect();

        let mut lines = Vec::with_capacity(product_ids.len());
        for (id, input) in product_ids.into_iter().zip(request.items.iter()) {
            let product = resolved.get(&id.to_string()).ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ProductNotFound,
                    format!("Product {} not found", id),
                )
                .with_detail("product", id.to_string())
            })?;
            lines.push(PricingLine {
                product: id,
                unit_price: product.price,
                discount_percent: product.discount,
                quantity: input.quantity,
            });
        }

        let priced = price_order(&lines)?;
        let now = now_millis();

        let order = Order {
            id: None,
            user,
            items: priced.items,
            total_amount: priced.total_amount,
            total_discount: priced.total_discount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let created = self.orders.create(order).await.map_err(storage_error)?;

        tracing::info!(
            order_id = ?created.id.as_ref().map(|id| id.to_string()),
            user_id = %user_id,
            items = created.items.len(),
            total_amount = created.total_amount,
            "Order created"
        );
        Ok(created)
    }
}

fn storage_error(err: RepoError) -> AppError {
    match err {
        RepoError::Validation(msg) => AppError::invalid_request(msg),
        other => AppError::database(other.to_string()),
    }
}
