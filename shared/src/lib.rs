//! Shared types for the coffee shop backend
//!
//! Error taxonomy, the JSON response envelope, request payloads and
//! background job payloads used by the server and its worker.

pub mod error;
pub mod models;
pub mod response;
pub mod task;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use response::{ApiResponse, ListResponse, ResponseStatus};
pub use serde::{Deserialize, Serialize};
