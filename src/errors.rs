//! Unified error type for the ledger.

use thiserror::Error;

/// Errors surfaced by the ledger stores, configuration, and persistence layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or contained invalid values
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A year/month pair outside chrono's supported calendar
    #[error("Invalid month: {year}-{month:02}")]
    InvalidMonth {
        /// Requested year
        year: i32,
        /// Requested month (1-12 expected)
        month: u32,
    },

    /// An amount that cannot be stored (infinite or NaN)
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f32,
    },

    /// Text that should have held a typed value could not be parsed
    #[error("Parse error: {message}")]
    Parse {
        /// Human-readable description of the problem
        message: String,
    },

    /// The SQLite backend reported a failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored value could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
