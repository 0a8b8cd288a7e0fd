//! HTTP API
//!
//! - [`health`] - liveness
//! - [`products`] - catalog, admin writes
//! - [`users`] - signup, login, account links, profiles
//! - [`orders`] - order placement
//!
//! Public and protected routes are merged into one router; protected groups
//! carry their own `require_auth` / role layers.

pub mod form;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Product forms carry a thumbnail and several images of up to 5MB each
const MAX_BODY_SIZE: usize = 32 * 1024 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Every route, without middleware or state
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(products::router(state))
        .merge(orders::router(state))
        .merge(users::router(state))
}

/// Fully configured application, used by the listener and by tests
pub fn build_app(state: ServerState) -> Router {
    build_router(&state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
