//! Error types for miniboard-jsonl operations.

use std::io;
use thiserror::Error;

/// The error type for miniboard-jsonl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A specific line could not be decoded.
    #[error("line {line_number}: {source}")]
    Line {
        /// 1-based line number of the offending line.
        line_number: usize,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid JSONL format.
    #[error("Invalid JSONL format: {0}")]
    InvalidFormat(String),
}

/// A specialized Result type for miniboard-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
