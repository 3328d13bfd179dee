//! Market data error types

use storage::StorageError;
use thiserror::Error;

/// Errors that can occur during market data operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Handle whose source quote no longer exists
    #[error("Dangling reference: source quote has been dropped")]
    DanglingReference,

    /// Tick field name that does not exist
    #[error("Unknown tick field: {0}")]
    UnknownField(String),

    /// Strike must be finite and positive
    #[error("Invalid strike price: {0}. Strike must be positive.")]
    InvalidStrike(f64),

    /// Symbol cannot be used (empty, too long for an OCC root, etc.)
    #[error("Invalid symbol: {symbol}. {message}")]
    InvalidSymbol { symbol: String, message: String },

    /// Tick would break the strictly increasing history
    #[error("Invalid history for {symbol}: {message}")]
    InvalidHistory { symbol: String, message: String },

    /// Symbol already present in the universe
    #[error("Duplicate security: {0}")]
    DuplicateSecurity(String),

    /// Malformed tick source row
    #[error("Invalid row {row} ({symbol}): {message}")]
    InvalidRow {
        row: usize,
        symbol: String,
        message: String,
    },

    /// Keyed store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
