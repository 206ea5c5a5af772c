//! SMTP mailer backed by lettre

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::domain::mail::{EmailMessage, Mailer};
use crate::domain::DomainError;

/// Connection settings for the SMTP relay
#[derive(Debug, Clone)]
pub struct SmtpMailerConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub starttls: bool,
}

/// Mailer delivering HTML messages through an SMTP relay
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    pub fn new(config: &SmtpMailerConfig) -> Result<Self, DomainError> {
        let from: Mailbox = config.from.parse().map_err(|e| {
            DomainError::configuration(format!("Invalid mail sender '{}': {}", config.from, e))
        })?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(|e| {
                DomainError::configuration(format!("Invalid SMTP relay '{}': {}", config.host, e))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, DomainError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| DomainError::delivery(format!("Invalid recipient address: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .map_err(|e| DomainError::delivery(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let email = self.build_message(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DomainError::delivery(format!("SMTP send failed: {}", e)))?;

        debug!(to = %message.to, "Email handed to SMTP relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpMailerConfig {
        SmtpMailerConfig {
            host: "localhost".to_string(),
            port: 1025,
            username: None,
            password: None,
            from: "Car Detail <no-reply@example.com>".to_string(),
            starttls: false,
        }
    }

    #[tokio::test]
    async fn test_new_rejects_bad_sender() {
        let mut config = config();
        config.from = "not an address".to_string();

        let result = SmtpMailer::new(&config);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_recipient() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let message = EmailMessage::new("nobody", "Subject", "<p>body</p>");

        let result = mailer.build_message(&message);
        assert!(matches!(result, Err(DomainError::Delivery { .. })));
    }

    #[tokio::test]
    async fn test_build_message_is_html() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let message = EmailMessage::new("alice@example.com", "Subject", "<p>body</p>");

        let built = mailer.build_message(&message).unwrap();
        let raw = String::from_utf8(built.formatted()).unwrap();

        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("To: alice@example.com"));
    }
}
