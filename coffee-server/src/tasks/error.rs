use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::mail::MailError;
use crate::storage::StorageError;

/// Job queue errors
#[derive(Debug, Error)]
pub enum TaskError {
    /// The queue could not accept the job
    #[error("Broker unavailable: {0}")]
    Broker(String),

    #[error("Invalid payload for {task_type}: {message}")]
    Payload { task_type: String, message: String },

    #[error("No handler registered for {0}")]
    UnknownTask(String),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Failed(String),
}

impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        let code = match &err {
            TaskError::Broker(_) => ErrorCode::BrokerUnavailable,
            TaskError::Payload { .. } => ErrorCode::TaskPayloadInvalid,
            TaskError::UnknownTask(_) => ErrorCode::TaskHandlerMissing,
            TaskError::Mail(_) => ErrorCode::MailDeliveryFailed,
            TaskError::Storage(_) => ErrorCode::ObjectStorageFailed,
            TaskError::Failed(_) => ErrorCode::InternalError,
        };
        AppError::with_message(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_error_maps_to_500() {
        let err: AppError = TaskError::Broker("connection refused".into()).into();
        assert_eq!(err.code, ErrorCode::BrokerUnavailable);
        assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
