//! Authentication and authorization
//!
//! - [`JwtService`]: token issuing and validation
//! - [`CurrentUser`]: the authenticated caller, attached by [`require_auth`]
//! - [`require_admin`] / [`require_role`]: role gates, answer 403
//! - [`link`]: one-time codes mailed in verification and reset links

pub mod jwt;
pub mod link;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use link::{LinkPurpose, generate_code, hash_code};
pub use middleware::{CurrentUserExt, require_admin, require_auth, require_role};
pub use password::{hash_password, verify_password};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shared::error::AppError;
use shared::models::Role;

use crate::db::models::User;

/// Authenticated caller, loaded from the database by [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// `user:<key>`
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub avatar: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
        }
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Whether `user_id` (`user:<key>` or bare key) is the caller
    pub fn is_self(&self, user_id: &str) -> bool {
        self.id == user_id || self.id.strip_prefix("user:") == Some(user_id)
    }
}

/// Reads the user attached by [`require_auth`]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}
