//! Account request payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /signup` body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(must_match(other = "password"))]
    pub confirm_password: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub phone_number: String,
}

/// `POST /login` body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// `POST /forgotpassword` body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// `PUT /resetpassword` body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub confirm_password: String,
}

/// `?token=<code>&timestamp=<expiry ms>` of verification and reset links
///
/// The timestamp is informational; the server checks the expiry it stored
/// with the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkQuery {
    pub token: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}
