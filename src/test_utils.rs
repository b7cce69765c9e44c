//! Shared test utilities.
//!
//! Helpers for setting up an in-memory `SQLite` store, quiet tracing output,
//! and terse date construction.

#![allow(clippy::expect_used)]

use crate::{errors::Result, store::SqliteStore};
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

/// Creates an in-memory `SQLite` database with the `preferences` table initialized.
/// This is the standard setup for all persistence tests.
pub async fn setup_test_db() -> Result<SqliteStore> {
    let db = crate::config::database::create_connection("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(SqliteStore::new(db))
}

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Builds a date, panicking on an invalid one.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}
