//! Error types for secret management.

use crate::crypto::CryptoError;
use crate::types::Role;
use thiserror::Error;

/// Errors that can occur during secret operations.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Access denied: role {role} cannot {operation}")]
    AccessDenied { role: Role, operation: String },

    #[error("Secret expired")]
    Expired,

    #[error("Crypto failure: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SecretError {
    /// True when the error is the decryption integrity failure.
    ///
    /// Callers map this to a "cannot decrypt" response; retrying is
    /// pointless because the same inputs fail the same way.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::Integrity))
    }
}

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
