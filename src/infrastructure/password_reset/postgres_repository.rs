//! PostgreSQL password reset token repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::password_reset::{
    PasswordResetToken, PasswordResetTokenRepository, TokenDigest,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of PasswordResetTokenRepository
#[derive(Debug, Clone)]
pub struct PostgresPasswordResetTokenRepository {
    pool: PgPool,
}

impl PostgresPasswordResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetTokenRepository for PostgresPasswordResetTokenRepository {
    async fn save(&self, token: PasswordResetToken) -> Result<PasswordResetToken, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (token_hash, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(token.digest().as_str())
        .bind(token.user_id().as_str())
        .bind(token.created_at())
        .bind(token.expires_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::conflict("Password reset token already exists");
                }
            }
            DomainError::storage(format!("Failed to save password reset token: {}", e))
        })?;

        Ok(token)
    }

    async fn find(&self, digest: &TokenDigest) -> Result<Option<PasswordResetToken>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT token_hash, user_id, created_at, expires_at
            FROM password_reset_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(digest.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find password reset token: {}", e)))?;

        row.as_ref().map(row_to_token).transpose()
    }

    async fn delete(&self, digest: &TokenDigest) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE token_hash = $1")
            .bind(digest.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to delete password reset token: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn take(&self, digest: &TokenDigest) -> Result<Option<PasswordResetToken>, DomainError> {
        // A single DELETE ... RETURNING lets exactly one concurrent caller win
        let row = sqlx::query(
            r#"
            DELETE FROM password_reset_tokens
            WHERE token_hash = $1
            RETURNING token_hash, user_id, created_at, expires_at
            "#,
        )
        .bind(digest.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to consume password reset token: {}", e)))?;

        row.as_ref().map(row_to_token).transpose()
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to delete user reset tokens: {}", e))
            })?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to purge expired reset tokens: {}", e))
            })?;

        Ok(result.rows_affected() as usize)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_tokens WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to count user reset tokens: {}", e))
                })?;

        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn row_to_token(row: &sqlx::postgres::PgRow) -> Result<PasswordResetToken, DomainError> {
    let decode =
        |e: sqlx::Error| DomainError::storage(format!("Failed to decode reset token row: {}", e));

    let token_hash: String = row.try_get("token_hash").map_err(decode)?;
    let user_id: String = row.try_get("user_id").map_err(decode)?;

    let user_id = UserId::new(user_id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(PasswordResetToken::restore(
        TokenDigest::from_hex(token_hash),
        user_id,
        row.try_get("created_at").map_err(decode)?,
        row.try_get("expires_at").map_err(decode)?,
    ))
}
