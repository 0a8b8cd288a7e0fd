//! User and account API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /signup, /login, /forgotpassword | POST | none |
//! | /resetpassword | PUT | link token |
//! | /verify | GET | link token |
//! | /users | GET | admin |
//! | /users/{id} | GET, PUT, DELETE | user, admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use shared::models::Role;

use crate::auth::{require_admin, require_auth, require_role};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/signup", post(handler::signup))
        .route("/login", post(handler::login))
        .route("/forgotpassword", post(handler::forgot_password))
        .route("/resetpassword", put(handler::reset_password))
        .route("/verify", get(handler::verify));

    let admin = Router::new()
        .route("/users", get(handler::list))
        .route_layer(middleware::from_fn(require_admin));

    let account = Router::new()
        .route(
            "/users/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route_layer(middleware::from_fn(require_role(&[Role::User, Role::Admin])));

    let protected = admin
        .merge(account)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected)
}
