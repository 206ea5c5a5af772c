//! Password reset workflow errors

use thiserror::Error;

use crate::domain::user::UserValidationError;
use crate::domain::DomainError;

/// Errors surfaced by the password reset workflow
#[derive(Debug, Error)]
pub enum PasswordResetError {
    /// Malformed input or password confirmation mismatch; nothing was mutated
    #[error("Validation error: {0}")]
    Validation(String),

    /// No user is registered with the given email; no token was issued
    #[error("No account is registered with this email address")]
    EmailNotFound,

    /// The token is unknown, already used or expired; nothing was mutated
    #[error("The password reset link is invalid or has expired")]
    TokenInvalid,

    /// The reset mail could not be delivered
    #[error("Failed to send the password reset email: {0}")]
    Delivery(String),

    #[error(transparent)]
    Store(#[from] DomainError),
}

impl From<UserValidationError> for PasswordResetError {
    fn from(err: UserValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
