//! In-memory password reset token repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::password_reset::{
    PasswordResetToken, PasswordResetTokenRepository, TokenDigest,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of PasswordResetTokenRepository, keyed by digest
#[derive(Debug, Default)]
pub struct InMemoryPasswordResetTokenRepository {
    tokens: RwLock<HashMap<String, PasswordResetToken>>,
}

impl InMemoryPasswordResetTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PasswordResetTokenRepository for InMemoryPasswordResetTokenRepository {
    async fn save(&self, token: PasswordResetToken) -> Result<PasswordResetToken, DomainError> {
        let mut tokens = self.tokens.write().await;
        let key = token.digest().as_str().to_string();

        if tokens.contains_key(&key) {
            return Err(DomainError::conflict("Password reset token already exists"));
        }

        tokens.insert(key, token.clone());
        Ok(token)
    }

    async fn find(&self, digest: &TokenDigest) -> Result<Option<PasswordResetToken>, DomainError> {
        Ok(self.tokens.read().await.get(digest.as_str()).cloned())
    }

    async fn delete(&self, digest: &TokenDigest) -> Result<bool, DomainError> {
        Ok(self.tokens.write().await.remove(digest.as_str()).is_some())
    }

    async fn take(&self, digest: &TokenDigest) -> Result<Option<PasswordResetToken>, DomainError> {
        Ok(self.tokens.write().await.remove(digest.as_str()))
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.user_id() != user_id);
        Ok(before - tokens.len())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));
        Ok(before - tokens.len())
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().filter(|t| t.user_id() == user_id).count())
    }
}
