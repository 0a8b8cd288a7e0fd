//! Unified error system
//!
//! - [`ErrorCode`]: standardized error codes
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`AppError`]: error type with code, message and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Task queue errors
//! - 6xxx: Product and upload errors
//! - 8xxx: User errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//! use shared::response::ApiResponse;
//!
//! let err = AppError::with_message(ErrorCode::ProductNotFound, "No such coffee")
//!     .with_detail("id", "product:abc");
//! let body = ApiResponse::<()>::error(&err);
//! assert_eq!(body.code, Some(6001));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
