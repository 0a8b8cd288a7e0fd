//! Order Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Order;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a fully priced order in one statement
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self
            .base
            .db()
            .create(ORDER_TABLE)
            .content(order)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }
}
