//! Error types for the Geocoin core library.

use thiserror::Error;

use crate::types::{Cell, CoinKey};

/// Top-level error type for all Geocoin operations.
#[derive(Error, Debug)]
pub enum GeocoinError {
    /// A collect or deposit referenced a coin that is not live in the
    /// container it was addressed to. Indicates caller-side state desync
    /// and is surfaced rather than swallowed, otherwise the
    /// exclusive-ownership invariant could be silently violated.
    #[error("Coin not found: {0}")]
    CoinNotFound(CoinKey),

    /// A command addressed a cell whose cache is not currently open.
    #[error("No open cache for cell {0}")]
    CacheNotOpen(Cell),

    /// A momento snapshot did not parse into the expected record shape.
    /// Callers fall back to fresh generation for the affected cell; a
    /// single corrupt snapshot must not block world generation elsewhere.
    #[error("Malformed snapshot {snapshot:?}: {reason}")]
    MalformedSnapshot {
        /// The offending snapshot string (truncated by the caller if huge).
        snapshot: String,
        /// What failed to parse.
        reason: String,
    },

    /// Persistence backend absent or failing. Sessions degrade to
    /// in-memory-only operation for the remainder of the session.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization or deserialization failure of persisted JSON state.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, GeocoinError>;
