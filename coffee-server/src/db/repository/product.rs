//! Product Repository

use super::task::INSERT_TASKS;
use super::{BaseRepository, RepoError, RepoResult, parse_record_id, transaction_error};
use crate::db::models::{
    DEFAULT_RATINGS, Product, ProductCreate, ProductUpdate, TaskCreate, TaskState,
};
use shared::util::now_millis;
use surrealdb::engine::any::Any;
use surrealdb::{RecordId, Surreal};

pub const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing = parse_record_id(PRODUCT_TABLE, id)?;
        self.find_by_record_id(thing).await
    }

    pub async fn find_by_record_id(&self, thing: RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(thing).await?;
        Ok(product)
    }

    /// Resolve a batch of ids; missing ids are simply absent from the result
    pub async fn find_many(&self, ids: Vec<RecordId>) -> RepoResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        self.create_with_tasks(data, Vec::new()).await
    }

    /// Create a new product and queue `tasks` (its image uploads) in the
    /// same transaction
    pub async fn create_with_tasks(
        &self,
        data: ProductCreate,
        tasks: Vec<TaskCreate>,
    ) -> RepoResult<Product> {
        let query = format!(
            r#"BEGIN TRANSACTION;
                CREATE product SET
                    name = $name,
                    price = $price,
                    discount = $discount,
                    category = $category,
                    summary = $summary,
                    description = $description,
                    ingredients = $ingredients,
                    thumbnail = $thumbnail,
                    images = $images,
                    author = $author,
                    ratings = $ratings,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER;
                {INSERT_TASKS}
                COMMIT TRANSACTION;"#
        );
        let mut result = self
            .base
            .db()
            .query(query)
            .bind(("name", data.name))
            .bind(("price", data.price))
            .bind(("discount", data.discount))
            .bind(("category", data.category))
            .bind(("summary", data.summary))
            .bind(("description", data.description))
            .bind(("ingredients", data.ingredients))
            .bind(("thumbnail", data.thumbnail))
            .bind(("images", data.images))
            .bind(("author", data.author))
            .bind(("ratings", DEFAULT_RATINGS))
            .bind(("tasks", tasks))
            .bind(("pending", TaskState::Pending))
            .bind(("now", now_millis()))
            .await?;

        if let Some(err) = transaction_error(&mut result, 1) {
            return Err(err);
        }
        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing = parse_record_id(PRODUCT_TABLE, id)?;

        if data.is_empty() {
            return self
                .find_by_record_id(thing)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let mut set_parts: Vec<&str> = vec!["updated_at = $now"];
        if data.name.is_some() { set_parts.push("name = $name"); }
        if data.price.is_some() { set_parts.push("price = $price"); }
        if data.discount.is_some() { set_parts.push("discount = $discount"); }
        if data.category.is_some() { set_parts.push("category = $category"); }
        if data.summary.is_some() { set_parts.push("summary = $summary"); }
        if data.description.is_some() { set_parts.push("description = $description"); }
        if data.ingredients.is_some() { set_parts.push("ingredients = $ingredients"); }
        if data.thumbnail.is_some() { set_parts.push("thumbnail = $thumbnail"); }
        if data.images.is_some() { set_parts.push("images = $images"); }

        // UPDATE on a missing record id would create it; WHERE id keeps it a no-op
        let query_str = format!(
            "UPDATE $thing SET {} WHERE id = $thing RETURN AFTER",
            set_parts.join(", ")
        );

        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("thing", thing))
            .bind(("now", now_millis()));

        if let Some(v) = data.name { query = query.bind(("name", v)); }
        if let Some(v) = data.price { query = query.bind(("price", v)); }
        if let Some(v) = data.discount { query = query.bind(("discount", v)); }
        if let Some(v) = data.category { query = query.bind(("category", v)); }
        if let Some(v) = data.summary { query = query.bind(("summary", v)); }
        if let Some(v) = data.description { query = query.bind(("description", v)); }
        if let Some(v) = data.ingredients { query = query.bind(("ingredients", v)); }
        if let Some(v) = data.thumbnail { query = query.bind(("thumbnail", v)); }
        if let Some(v) = data.images { query = query.bind(("images", v)); }

        let updated: Option<Product> = query.await?.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Delete a product, returning the removed record
    pub async fn delete(&self, id: &str) -> RepoResult<Product> {
        let thing = parse_record_id(PRODUCT_TABLE, id)?;
        let deleted: Option<Product> = self.base.db().delete(thing).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }
}
