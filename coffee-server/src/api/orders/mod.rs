//! Order API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /products/orders | POST | user, admin |

mod handler;

use axum::{Router, middleware, routing::post};
use shared::models::Role;

use crate::auth::{require_auth, require_role};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/products/orders", post(handler::create))
        .route_layer(middleware::from_fn(require_role(&[Role::User, Role::Admin])))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
