//! Mailer that writes to the log instead of sending

use async_trait::async_trait;
use tracing::info;

use crate::domain::mail::{EmailMessage, Mailer};
use crate::domain::DomainError;

/// Development mailer. The body is never logged since it carries reset links.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), DomainError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.html_body.len(),
            "email send stub"
        );
        Ok(())
    }
}
