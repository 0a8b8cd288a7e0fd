//! Core module: configuration, state, server lifecycle
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - state shared by handlers
//! - [`Server`] - HTTP listener and job processor host
//! - [`BackgroundTasks`] - spawned task registry

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::{Config, RunMode, SmtpConfig, WorkerConfig};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
