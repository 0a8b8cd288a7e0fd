//! Coffee Server - coffee shop backend
//!
//! # Architecture
//!
//! - **HTTP API** (`api`): catalog, accounts and order placement over axum
//! - **Database** (`db`): SurrealDB, `rocksdb://` in production and `mem://` in tests
//! - **Auth** (`auth`): JWT + Argon2, role gates
//! - **Pricing** (`pricing`, `orders`): Decimal line pricing, single-insert orders
//! - **Jobs** (`tasks`): persistent queue in the `task` table, worker loop with retries
//! - **Collaborators** (`mail`, `storage`): SMTP and S3 behind traits
//!
//! # Layout
//!
//! ```text
//! coffee-server/src/
//! ├── core/          # config, state, server lifecycle, background tasks
//! ├── api/           # routes and handlers
//! ├── auth/          # JWT, passwords, middleware
//! ├── db/            # models and repositories
//! ├── orders/        # order placement
//! ├── pricing/       # money arithmetic
//! ├── tasks/         # job distributor, processor, handlers
//! ├── mail/          # mailer trait, SMTP, templates
//! ├── storage/       # object store trait, S3
//! ├── media/         # upload validation
//! └── utils/         # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod mail;
pub mod media;
pub mod orders;
pub mod pricing;
pub mod storage;
pub mod tasks;
pub mod utils;

pub use api::build_app;
pub use auth::{CurrentUser, JwtService};
pub use crate::core::{Config, RunMode, Server, ServerState};
pub use shared::error::{AppError, AppResult, ErrorCode};
pub use tasks::{TaskDistributor, TaskOptions, TaskProcessor};
pub use utils::{init_logger, init_logger_with_file};

/// Load `.env` from the working directory, if present
pub fn setup_environment() {
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from {}", path.display());
    }
}

// Security logging macro - target "security"
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
