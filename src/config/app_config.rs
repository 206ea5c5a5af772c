use serde::Deserialize;

use crate::infrastructure::mail::SmtpMailerConfig;
use crate::infrastructure::password_reset::PasswordResetSettings;
use crate::infrastructure::storage::PostgresConfig;

/// Placeholder signing secret; startup warns while it is in use
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub password_reset: PasswordResetConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Database settings; without a URL the in-memory stores are used
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    #[default]
    Log,
    Smtp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub starttls: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordResetConfig {
    pub token_ttl_minutes: i64,
    pub reset_link_base: String,
    pub conceal_unknown_email: bool,
    pub invalidate_sibling_tokens: bool,
    /// Interval of the expired-token sweep; 0 disables it
    pub purge_interval_minutes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    /// Postgres pool settings, or `None` when no URL is configured
    pub fn postgres(&self) -> Option<PostgresConfig> {
        self.url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| PostgresConfig::new(url).with_max_connections(self.max_connections))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            backend: MailBackend::default(),
            host: "localhost".to_string(),
            port: 25,
            username: None,
            password: None,
            from: "Car Detail <no-reply@localhost>".to_string(),
            starttls: false,
        }
    }
}

impl MailConfig {
    pub fn smtp(&self) -> SmtpMailerConfig {
        SmtpMailerConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            from: self.from.clone(),
            starttls: self.starttls,
        }
    }
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: 60,
            reset_link_base: "http://localhost:8080/user/reset_password_confirm".to_string(),
            conceal_unknown_email: false,
            invalidate_sibling_tokens: true,
            purge_interval_minutes: 15,
        }
    }
}

impl PasswordResetConfig {
    pub fn settings(&self) -> PasswordResetSettings {
        PasswordResetSettings {
            token_ttl: chrono::Duration::minutes(self.token_ttl_minutes.max(1)),
            reset_link_base: self.reset_link_base.trim_end_matches('?').to_string(),
            conceal_unknown_email: self.conceal_unknown_email,
            invalidate_sibling_tokens: self.invalidate_sibling_tokens,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert!(config.database.postgres().is_none());
        assert_eq!(config.mail.backend, MailBackend::Log);
        assert_eq!(config.password_reset.token_ttl_minutes, 60);
        assert!(!config.password_reset.conceal_unknown_email);
        assert!(config.password_reset.invalidate_sibling_tokens);
    }

    #[test]
    fn test_database_url_selects_postgres() {
        let database = DatabaseConfig {
            url: Some("postgres://db/cars".to_string()),
            max_connections: 4,
        };

        let pg = database.postgres().unwrap();
        assert_eq!(pg.url, "postgres://db/cars");
        assert_eq!(pg.max_connections, 4);

        let blank = DatabaseConfig {
            url: Some("  ".to_string()),
            max_connections: 4,
        };
        assert!(blank.postgres().is_none());
    }

    #[test]
    fn test_password_reset_settings() {
        let config = PasswordResetConfig {
            token_ttl_minutes: 15,
            reset_link_base: "https://cars.example.com/reset?".to_string(),
            conceal_unknown_email: true,
            invalidate_sibling_tokens: false,
            purge_interval_minutes: 0,
        };

        let settings = config.settings();
        assert_eq!(settings.token_ttl, chrono::Duration::minutes(15));
        assert_eq!(settings.reset_link_base, "https://cars.example.com/reset");
        assert!(settings.conceal_unknown_email);
        assert!(!settings.invalidate_sibling_tokens);
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: AppConfig = config::Config::builder()
            .set_override("mail.backend", "smtp")
            .unwrap()
            .set_override("server.port", 9090)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.mail.backend, MailBackend::Smtp);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
