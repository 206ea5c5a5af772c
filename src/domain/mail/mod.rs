//! Outbound mail abstraction

use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// An HTML email addressed to a single recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}

/// Mail delivery collaborator.
///
/// Implementations return `DomainError::Delivery` on transport failure.
/// Callers surface the failure and do not retry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Mailer: Send + Sync + Debug {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), DomainError>;
}
