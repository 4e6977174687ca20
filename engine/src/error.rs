//! Error types for the Tablesync engine.

use crate::ColumnId;
use thiserror::Error;

/// All possible errors from the Tablesync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("record missing key column {0}")]
    MissingKeyColumn(ColumnId),

    #[error("filter column '{0}' is not a key column")]
    FilterColumnNotKey(ColumnId),

    #[error("invalid row id: {0}")]
    InvalidRowId(String),

    // Wire errors
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl Error {
    /// Whether the error was caused by caller input rather than a remote reply.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::MalformedPayload(_))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
