//! Password reset domain
//!
//! Single-use reset tokens bound to a user, the storage contract for them,
//! and the error taxonomy of the reset workflow.

mod entity;
mod error;
mod repository;

pub use entity::{PasswordResetToken, TokenDigest};
pub use error::PasswordResetError;
pub use repository::PasswordResetTokenRepository;

#[cfg(test)]
pub use repository::MockPasswordResetTokenRepository;
