//! Migrate command - applies or reverts the PostgreSQL schema

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{connect_pool, Migrator, PostgresMigrator};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the latest applied migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let pg_config = config
        .database
        .postgres()
        .context("database.url is not set (APP__DATABASE__URL)")?;

    let pool = connect_pool(&pg_config).await?;
    let migrator = PostgresMigrator::new(pool);

    if args.revert {
        match migrator.revert().await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = migrator.run().await?;
        let version = migrator.version().await?;
        info!(applied, version = ?version, "Migrations complete");
    }

    Ok(())
}
