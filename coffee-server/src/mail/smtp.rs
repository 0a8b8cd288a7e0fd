use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailError, Mailer};
use crate::core::config::SmtpConfig;

/// SMTP mailer (STARTTLS relay with credentials)
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        if config.host.is_empty() {
            return Err(MailError::NotConfigured("SMTP_HOST is empty".to_string()));
        }

        let sender: Mailbox = config
            .sender
            .parse()
            .map_err(|_| MailError::InvalidAddress(config.sender.clone()))?;

        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { transport, sender })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let receiver: Mailbox = to
            .parse()
            .map_err(|_| MailError::InvalidAddress(to.to_string()))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(receiver)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::debug!(to = %to, subject = %subject, "Mail sent");
        Ok(())
    }
}
