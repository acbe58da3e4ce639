//! Error types for Controle core.

use thiserror::Error;

/// Configuration-related errors.
///
/// All of these are fatal at startup: the process refuses to serve any
/// operation with an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
