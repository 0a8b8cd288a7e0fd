//! Outgoing mail
//!
//! Handlers depend on the [`Mailer`] trait; [`SmtpMailer`] is the production
//! implementation on top of lettre's async SMTP transport.

mod smtp;
pub mod templates;

pub use smtp::SmtpMailer;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Mailer not configured: {0}")]
    NotConfigured(String),
}

/// A plain-text mail sender
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
