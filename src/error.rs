//! Error types for the cycle log extractor.

use thiserror::Error;

use crate::fields::BlockError;
use crate::models::OperationKind;
use crate::provenance::TimestampError;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when loading, flattening or writing cycle logs.
#[derive(Debug, Error)]
pub enum Error {
    /// A measurement block could not be turned into equal-length columns.
    #[error("Malformed measurement block (cycle {cycle}, operation {operation}): {source}")]
    MalformedBlock {
        cycle: usize,
        operation: usize,
        #[source]
        source: BlockError,
    },

    /// An operation's start time components do not form a valid timestamp.
    #[error("Malformed start time (cycle {cycle}, operation {operation}): {source}")]
    MalformedTimestamp {
        cycle: usize,
        operation: usize,
        #[source]
        source: TimestampError,
    },

    /// No operation of the requested kind exists anywhere in the document.
    #[error("No {target} operations found in document")]
    EmptyResult { target: OperationKind },

    /// The requested target type is neither `charge` nor `discharge`.
    #[error("Unsupported operation type '{0}', expected 'charge' or 'discharge'")]
    UnsupportedType(String),

    /// The document does not have the expected `cycle` layout
    #[error("Invalid document format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Output format error (e.g., Parquet write error)
    #[error("Output error: {0}")]
    OutputError(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
