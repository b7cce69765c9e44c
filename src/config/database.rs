//! Database configuration module.
//!
//! This module handles `SQLite` connection setup and table creation using `SeaORM`.
//! The single `preferences` table is generated from its entity definition with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust model.

use crate::entities::Preference;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::debug;

/// Fallback used when neither `DATABASE_URL` nor `config.toml` names a database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://day_ledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns
/// the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the `preferences` table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut preference_table = schema.create_table_from_entity(Preference);
    preference_table.if_not_exists();

    db.execute(builder.build(&preference_table)).await?;

    Ok(())
}
