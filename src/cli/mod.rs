//! CLI module for the car detail account service
//!
//! - `serve`: run the HTTP API
//! - `migrate`: apply or revert PostgreSQL schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Car Detail - site accounts and password reset service
#[derive(Parser)]
#[command(name = "car-detail")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Manage the database schema
    Migrate(migrate::MigrateArgs),
}

/// Load `.env`, configuration files and `APP__*` variables, then install logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let loaded = AppConfig::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };

    logging::init_logging(&config.logging);

    if let Err(e) = loaded {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
    }

    config
}
