//! One-time codes for verification and password-reset links
//!
//! The mailed link carries the plain code; only its SHA-256 digest is stored,
//! bound to the user and the purpose it was issued for.

use ring::digest::{SHA256, digest};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

/// What a link code may be redeemed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPurpose {
    Verify,
    ResetPassword,
}

impl LinkPurpose {
    /// Path segment of the mailed link
    pub fn path(&self) -> &'static str {
        match self {
            LinkPurpose::Verify => "verify",
            LinkPurpose::ResetPassword => "resetpassword",
        }
    }
}

/// 64 hex characters from the system RNG
pub fn generate_code() -> Result<String, AppError> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::internal("Failed to generate link code"))?;
    Ok(hex::encode(bytes))
}

/// Hex SHA-256 of a code, the form kept in the database
pub fn hash_code(code: &str) -> String {
    hex::encode(digest(&SHA256, code.as_bytes()))
}
