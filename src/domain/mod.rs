//! Domain layer - Core business logic and entities

pub mod error;
pub mod mail;
pub mod password_reset;
pub mod user;

pub use error::DomainError;
pub use mail::{EmailMessage, Mailer};
pub use password_reset::{
    PasswordResetError, PasswordResetToken, PasswordResetTokenRepository, TokenDigest,
};
pub use user::{User, UserId, UserRepository, UserValidationError};
