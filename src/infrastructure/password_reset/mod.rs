//! Password reset infrastructure
//!
//! Token generation, in-memory and PostgreSQL token stores, and the
//! service driving issuance, the reset mail and redemption.

mod generator;
mod postgres_repository;
mod repository;
mod service;

pub use generator::{GeneratedResetToken, ResetTokenGenerator};
pub use postgres_repository::PostgresPasswordResetTokenRepository;
pub use repository::InMemoryPasswordResetTokenRepository;
pub use service::{PasswordResetService, PasswordResetSettings};
