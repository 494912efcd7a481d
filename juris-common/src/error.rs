//! Common error types for Juris

use thiserror::Error;

/// Common result type for Juris operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Juris services
///
/// Every variant except `Database`, `Io` and `Internal` is recoverable by the
/// caller (redirect or message); none of them is fatal to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No active law exists at all
    #[error("No laws are available")]
    NoLawsAvailable,

    /// The user's law selection resolves to zero active articles
    #[error("Selected laws contain no active articles")]
    EmptySelection,

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Requested phase exists but is locked for this user
    #[error("Phase {phase_id} is blocked")]
    BlockedAccess { phase_id: u32 },

    /// Malformed input; no state was mutated
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
