//! Error types for board operations.

use crate::domain::EntityKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for board operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// The id that did not resolve.
        id: u64,
    },

    /// The operation would violate a uniqueness rule.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Problems locating or reading the board configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.miniboard` directory in the current directory or its parents.
    #[error("Not a miniboard directory (or any parent): .miniboard not found")]
    NotInitialized,

    /// `init` was run where a board already exists.
    #[error("Board already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// The config file could not be parsed.
    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The config file parsed but holds unusable values.
    #[error("{0}")]
    Invalid(String),
}

/// Problems in the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The data file could not be read or written.
    #[error(transparent)]
    Jsonl(#[from] miniboard_jsonl::Error),

    /// The stored data is structurally unusable.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

/// A specialized Result type for board operations.
pub type Result<T> = std::result::Result<T, Error>;
