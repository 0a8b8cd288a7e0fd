//! Link Code Model

use super::serde_helpers;
use crate::auth::LinkPurpose;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Outstanding verification or reset code; at most one per user and purpose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCode {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub purpose: LinkPurpose,
    /// Hex SHA-256 of the mailed code
    pub code_hash: String,
    /// Unix millis
    pub expires_at: i64,
    #[serde(default)]
    pub created_at: i64,
}
