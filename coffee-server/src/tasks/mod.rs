//! Background jobs
//!
//! HTTP handlers enqueue jobs through [`TaskDistributor`]; a
//! [`TaskProcessor`] picks them up from the `task` table and dispatches them
//! to the registered [`TaskHandler`]s.

pub mod distributor;
mod error;
pub mod handlers;
pub mod processor;

pub use distributor::{TaskDistributor, TaskOptions};
pub use error::TaskError;
pub use handlers::register_handlers;
pub use processor::{ProcessorConfig, TaskHandler, TaskProcessor};
