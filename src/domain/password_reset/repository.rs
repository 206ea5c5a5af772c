//! Password reset token repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

use super::entity::{PasswordResetToken, TokenDigest};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository for password reset token persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PasswordResetTokenRepository: Send + Sync {
    /// Persist a new token record
    async fn save(&self, token: PasswordResetToken) -> Result<PasswordResetToken, DomainError>;

    /// Find a token record by exact digest match
    async fn find(&self, digest: &TokenDigest) -> Result<Option<PasswordResetToken>, DomainError>;

    /// Delete a token record, returning whether it existed
    async fn delete(&self, digest: &TokenDigest) -> Result<bool, DomainError>;

    /// Atomically find and delete a token record.
    ///
    /// At most one concurrent caller receives `Some` for a given digest.
    async fn take(&self, digest: &TokenDigest) -> Result<Option<PasswordResetToken>, DomainError>;

    /// Delete every outstanding token for a user, returning how many were removed
    async fn delete_for_user(&self, user_id: &UserId) -> Result<usize, DomainError>;

    /// Delete every token expired at `now`, returning how many were removed
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Count outstanding tokens for a user
    async fn count_for_user(&self, user_id: &UserId) -> Result<usize, DomainError>;
}
