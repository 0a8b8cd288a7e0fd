//! API Response types
//!
//! Every endpoint answers with one of two envelopes:
//! ```json
//! { "status": "success", "data": { ... } }
//! { "status": "failed", "code": 6001, "error": "Product not found" }
//! ```

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Envelope status marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Unified API response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    /// Error code (failures only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Bearer token (signup / login)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (failures only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            code: None,
            token: None,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    /// Attach a bearer token to the response
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

impl ApiResponse<()> {
    /// Success without data
    pub fn ok() -> Self {
        Self {
            status: ResponseStatus::Success,
            code: None,
            token: None,
            data: None,
            error: None,
            details: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            status: ResponseStatus::Failed,
            code: Some(err.code.code()),
            token: None,
            data: None,
            error: Some(err.message.clone()),
            details: err.details.clone(),
        }
    }
}

/// List envelope: `{status, results, data: [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub status: ResponseStatus,
    /// Number of entries in `data`
    pub results: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            status: ResponseStatus::Success,
            results: data.len(),
            data,
        }
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match (self.status, self.code) {
            (ResponseStatus::Success, _) => http::StatusCode::OK,
            (ResponseStatus::Failed, Some(code)) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR),
            (ResponseStatus::Failed, None) => http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ListResponse<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": 42}));
    }

    #[test]
    fn test_token_envelope() {
        let json = serde_json::to_value(ApiResponse::<()>::ok().with_token("abc")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "token": "abc"}));
    }

    #[test]
    fn test_failed_envelope() {
        let err = AppError::new(ErrorCode::AdminRequired);
        let json = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["code"], 2003);
        assert_eq!(json["error"], "Administrator role is required");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_list_envelope() {
        let json = serde_json::to_value(ListResponse::new(vec!["a", "b"])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "results": 2, "data": ["a", "b"]})
        );
    }

    #[test]
    fn test_envelope_deserialize() {
        let json = r#"{"status":"failed","code":6001,"error":"Product not found"}"#;
        let response: ApiResponse<()> = serde_json::from_str(json).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.code, Some(6001));
    }
}
