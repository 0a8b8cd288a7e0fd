//! Product API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /products | GET | none |
//! | /products/{category}/{id} | GET | none |
//! | /products | POST | admin |
//! | /products/{id} | PUT, DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/products", get(handler::list))
        .route("/products/{category}/{id}", get(handler::get_by_id));

    let admin = Router::new()
        .route("/products", post(handler::create))
        .route("/products/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(admin)
}
