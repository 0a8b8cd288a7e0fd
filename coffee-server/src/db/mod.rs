//! Database Module
//!
//! SurrealDB through the `any` engine: `rocksdb://<path>` in production,
//! `mem://` in tests.

pub mod models;
pub mod repository;

use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};

/// Indexes the application relies on
///
/// The unique indexes make signup races and duplicate product names fail at
/// the database instead of in application code.
const SCHEMA: &str = r#"
DEFINE INDEX IF NOT EXISTS user_email ON TABLE user FIELDS email UNIQUE;
DEFINE INDEX IF NOT EXISTS user_username ON TABLE user FIELDS username UNIQUE;
DEFINE INDEX IF NOT EXISTS product_name ON TABLE product FIELDS name UNIQUE;
DEFINE INDEX IF NOT EXISTS order_user ON TABLE `order` FIELDS user;
DEFINE INDEX IF NOT EXISTS link_code_hash ON TABLE link_code FIELDS code_hash UNIQUE;
DEFINE INDEX IF NOT EXISTS link_code_user ON TABLE link_code FIELDS user, purpose;
DEFINE INDEX IF NOT EXISTS task_due ON TABLE task FIELDS state, queue, process_at;
"#;

/// Database service, owns the connection handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Any>,
}

impl DbService {
    /// Connect, select namespace/database and apply the schema
    pub async fn new(url: &str, namespace: &str, database: &str) -> Result<Self, AppError> {
        let db = any::connect(url)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database {url}: {e}")))?;

        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| AppError::database(format!("Failed to select {namespace}/{database}: {e}")))?;

        db.query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;

        tracing::info!(url = %url, namespace = %namespace, database = %database, "Database connection established");

        Ok(Self { db })
    }

    /// Fresh in-memory database
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::new("mem://", "coffee", "test").await
    }
}
