//! Health check route
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |
//!
//! ```json
//! { "status": "success", "data": { "version": "0.1.0" } }
//! ```

use axum::{Router, routing::get};
use serde::Serialize;
use shared::response::ApiResponse;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    version: &'static str,
}

/// GET /health
pub async fn health() -> ApiResponse<HealthResponse> {
    ApiResponse::success(HealthResponse {
        version: env!("CARGO_PKG_VERSION"),
    })
}
