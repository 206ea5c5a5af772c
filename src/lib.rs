//! Car Detail account service
//!
//! Site accounts for the car detail board:
//! - Signup, login with signed session tokens, and profile lookup
//! - Password reset through single-use, expiring links sent by email
//! - In-memory or PostgreSQL storage selected by configuration

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::{MailBackend, MailConfig, DEFAULT_JWT_SECRET};
use domain::mail::Mailer;
use domain::password_reset::PasswordResetTokenRepository;
use domain::user::UserRepository;
use infrastructure::{
    auth::{JwtConfig, JwtService},
    mail::{LogMailer, SmtpMailer},
    password_reset::{
        InMemoryPasswordResetTokenRepository, PasswordResetService,
        PostgresPasswordResetTokenRepository,
    },
    storage::{connect_pool, Migrator, PostgresMigrator},
    user::{Argon2Hasher, InMemoryUserRepository, PasswordHasher, PostgresUserRepository, UserService},
};
use tracing::{info, warn};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state, selecting storage and mail backends from configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let mailer = create_mailer(&config.mail)?;
    let hasher = Arc::new(Argon2Hasher::new());

    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("auth.jwt_secret is the built-in default; set APP__AUTH__JWT_SECRET in production");
    }

    match config.database.postgres() {
        Some(pg_config) => {
            info!("Connecting to PostgreSQL...");
            let pool = connect_pool(&pg_config).await?;

            let applied = PostgresMigrator::new(pool.clone()).run().await?;
            info!(applied, "Database schema up to date");

            Ok(build_app_state(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresPasswordResetTokenRepository::new(pool)),
                hasher,
                mailer,
                config,
            ))
        }
        None => {
            info!("No database configured, using in-memory storage");
            Ok(build_app_state(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryPasswordResetTokenRepository::new()),
                hasher,
                mailer,
                config,
            ))
        }
    }
}

/// Wire services over the given stores
pub fn build_app_state<U, T, H>(
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
    mailer: Arc<dyn Mailer>,
    config: &AppConfig,
) -> AppState
where
    U: UserRepository + 'static,
    T: PasswordResetTokenRepository + 'static,
    H: PasswordHasher + 'static,
{
    let user_service = Arc::new(UserService::new(Arc::clone(&users), Arc::clone(&hasher)));
    let password_reset_service = Arc::new(PasswordResetService::new(
        users,
        tokens,
        hasher,
        mailer,
        config.password_reset.settings(),
    ));
    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    )));

    AppState::new(user_service, password_reset_service, jwt_service)
}

/// Build the configured mail backend
pub fn create_mailer(config: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match config.backend {
        MailBackend::Log => {
            info!("Mail backend: log (messages are not delivered)");
            Ok(Arc::new(LogMailer::new()))
        }
        MailBackend::Smtp => {
            info!(host = %config.host, port = config.port, "Mail backend: SMTP");
            Ok(Arc::new(SmtpMailer::new(&config.smtp())?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_state_uses_memory_storage() {
        let state = create_app_state().await.unwrap();

        assert_eq!(state.user_service.count().await.unwrap(), 0);
        assert_eq!(state.jwt_service.expiration_hours(), 24);
    }

    #[test]
    fn test_create_mailer_rejects_bad_smtp_sender() {
        let config = MailConfig {
            backend: MailBackend::Smtp,
            from: "not an address".to_string(),
            ..Default::default()
        };

        assert!(create_mailer(&config).is_err());
    }
}
