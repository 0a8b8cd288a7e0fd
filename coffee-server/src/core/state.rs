use std::sync::Arc;

use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    LinkCodeRepository, OrderRepository, ProductRepository, UserRepository,
};
use crate::orders::OrderService;
use crate::tasks::TaskDistributor;

/// Shared state handed to every request handler
///
/// Cheap to clone: the database handle and the JWT service are reference
/// counted, repositories are built on demand from the handle.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: Surreal<Any>,
    jwt_service: Arc<JwtService>,
    tasks: TaskDistributor,
}

impl ServerState {
    pub fn new(config: Config, db: Surreal<Any>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let tasks = TaskDistributor::new(db.clone());
        Self {
            config: Arc::new(config),
            db,
            jwt_service,
            tasks,
        }
    }

    /// Open the configured database and build the state around it
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(
            &config.database_url,
            &config.database_namespace,
            &config.database_name,
        )
        .await?;

        tracing::info!(
            environment = %config.environment,
            run_mode = %config.run_mode,
            "Server state initialized"
        );

        Ok(Self::new(config.clone(), db.db))
    }

    pub fn get_db(&self) -> Surreal<Any> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Job producer used by the HTTP handlers
    pub fn tasks(&self) -> &TaskDistributor {
        &self.tasks
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub fn link_codes(&self) -> LinkCodeRepository {
        LinkCodeRepository::new(self.db.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(
            ProductRepository::new(self.db.clone()),
            OrderRepository::new(self.db.clone()),
        )
    }
}
