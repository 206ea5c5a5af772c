//! Database migrations infrastructure

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations, returning how many were applied
    async fn run(&self) -> Result<usize, DomainError>;

    /// Reverts the latest applied migration, returning its version
    async fn revert(&self) -> Result<Option<i64>, DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// A versioned schema change with its inverse
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    pub up: String,
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Schema for accounts and password reset tokens
pub fn schema_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(50) PRIMARY KEY,
                username VARCHAR(50) NOT NULL UNIQUE,
                email VARCHAR(254) NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                last_login_at TIMESTAMPTZ
            );
            "#,
            r#"
            DROP TABLE IF EXISTS users;
            "#,
        ),
        Migration::new(
            2,
            "Create password reset tokens table",
            r#"
            CREATE TABLE IF NOT EXISTS password_reset_tokens (
                token_hash CHAR(64) PRIMARY KEY,
                user_id VARCHAR(50) NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                expires_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_password_reset_tokens_user_id
                ON password_reset_tokens(user_id);
            CREATE INDEX IF NOT EXISTS idx_password_reset_tokens_expires_at
                ON password_reset_tokens(expires_at);
            "#,
            r#"
            DROP TABLE IF EXISTS password_reset_tokens;
            "#,
        ),
    ]
}

/// Splits a migration script into single statements for the prepared-query path.
/// Scripts must not contain `;` inside literals or function bodies.
fn split_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// PostgreSQL migrator tracking applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self::with_migrations(pool, schema_migrations())
    }

    pub fn with_migrations(pool: PgPool, migrations: Vec<Migration>) -> Self {
        Self { pool, migrations }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Applies one migration and records it in the same transaction
    async fn apply(&self, migration: &Migration) -> Result<(), DomainError> {
        let fail = |e: sqlx::Error| {
            DomainError::storage(format!(
                "Failed to run migration {}: {}",
                migration.version, e
            ))
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        for statement in split_statements(&migration.up) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(fail)?;
        }

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        info!(
            version = migration.version,
            description = %migration.description,
            "Applied migration"
        );
        Ok(())
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<usize, DomainError> {
        self.ensure_migrations_table().await?;

        let mut applied = 0;
        for migration in &self.migrations {
            if self.is_applied(migration.version).await? {
                continue;
            }
            self.apply(migration).await?;
            applied += 1;
        }

        Ok(applied)
    }

    async fn revert(&self) -> Result<Option<i64>, DomainError> {
        let Some(current) = self.version().await? else {
            return Ok(None);
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == current)
            .ok_or_else(|| {
                DomainError::storage(format!("Unknown applied migration version {}", current))
            })?;

        let fail = |e: sqlx::Error| {
            DomainError::storage(format!("Failed to revert migration {}: {}", current, e))
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        for statement in split_statements(&migration.down) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(fail)?;
        }

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(current)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        info!(version = current, "Reverted migration");
        Ok(Some(current))
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}
