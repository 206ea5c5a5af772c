//! Password reset token entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::user::UserId;

/// SHA-256 digest (lowercase hex) of a raw reset token.
///
/// Only the digest is persisted; a presented token resolves to a record when
/// its digest matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Digest a raw token value
    pub fn of(raw_token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(raw_token.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an already computed digest read back from storage
    pub fn from_hex(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single-use password reset capability bound to one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordResetToken {
    digest: TokenDigest,
    user_id: UserId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Create a token record that stays valid for `ttl`
    pub fn new(digest: TokenDigest, user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            digest,
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Rebuild a token record from persisted state
    pub fn restore(
        digest: TokenDigest,
        user_id: UserId,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            digest,
            user_id,
            created_at,
            expires_at,
        }
    }

    pub fn digest(&self) -> &TokenDigest {
        &self.digest
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic_hex() {
        let a = TokenDigest::of("token-value");
        let b = TokenDigest::of("token-value");

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_differs_per_token() {
        assert_ne!(TokenDigest::of("token-a"), TokenDigest::of("token-b"));
    }

    #[test]
    fn test_digest_is_case_sensitive() {
        assert_ne!(TokenDigest::of("Token"), TokenDigest::of("token"));
    }

    #[test]
    fn test_token_expiry() {
        let token = PasswordResetToken::new(
            TokenDigest::of("abc"),
            UserId::generate(),
            Duration::minutes(30),
        );

        assert!(!token.is_expired());
        assert!(token.is_expired_at(token.created_at() + Duration::minutes(30)));
        assert!(!token.is_expired_at(token.created_at() + Duration::minutes(29)));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let token =
            PasswordResetToken::new(TokenDigest::of("abc"), UserId::generate(), Duration::zero());

        assert!(token.is_expired());
    }
}
