//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use shared::models::Role;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Require a valid bearer token
///
/// Validates `Authorization: Bearer <token>`, loads the referenced user and
/// inserts [`CurrentUser`] into the request extensions.
///
/// | Failure | Status |
/// |---------|--------|
/// | missing or malformed header | 401 NotAuthenticated / TokenInvalid |
/// | expired token | 401 TokenExpired |
/// | user deleted, or password changed after the token was issued | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().to_string());
            return Err(AppError::unauthorized());
        }
    };

    let claims = match state.get_jwt_service().validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().to_string()
            );
            return match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    let user = match state.users().find_by_id(&claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) | Err(crate::db::repository::RepoError::Validation(_)) => {
            security_log!("WARN", "auth_unknown_user", user_id = claims.sub.clone());
            return Err(AppError::invalid_token("User no longer exists"));
        }
        Err(e) => return Err(e.into()),
    };

    // Seconds resolution: a token issued in the same second as the reset stays valid
    if let Some(changed_at) = user.password_changed_at
        && claims.iat < changed_at / 1000
    {
        security_log!("WARN", "auth_stale_token", user_id = claims.sub.clone());
        return Err(AppError::invalid_token(
            "Password changed recently, please log in again",
        ));
    }

    req.extensions_mut().insert(CurrentUser::from(&user));
    Ok(next.run(req).await)
}

/// Require the admin role; run after [`require_auth`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id.clone(),
            username = user.username.clone(),
            user_role = user.role.to_string()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

/// Require one of `roles`; run after [`require_auth`]
///
/// ```ignore
/// Router::new()
///     .route("/users/{id}", get(handler::get_by_id))
///     .route_layer(middleware::from_fn(require_role(&[Role::User, Role::Admin])));
/// ```
pub fn require_role(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req.current_user()?;

            if !user.has_role(roles) {
                security_log!(
                    "WARN",
                    "role_required",
                    user_id = user.id.clone(),
                    user_role = user.role.to_string()
                );
                return Err(AppError::new(ErrorCode::RoleRequired));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Access the authenticated user from a request
pub trait CurrentUserExt {
    /// 401 when the request did not pass [`require_auth`]
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::unauthorized)
    }
}
