//! Storage infrastructure - PostgreSQL pooling and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{schema_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
