//! Server startup errors

use shared::error::AppError;
use thiserror::Error;

use crate::mail::MailError;
use crate::storage::StorageError;

/// Errors that stop the process from starting or serving
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
