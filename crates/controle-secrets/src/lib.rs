//! Encrypted secret management for Controle.
//!
//! Secret values are encrypted with AES-256-GCM under a key derived from a
//! configured passphrase, stored as three-part cipher bundles through a
//! pluggable storage backend, and every operation leaves an audit entry.

pub mod audit;
pub mod crypto;
pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use audit::{AuditAction, AuditEntry, AuditSink, FileAuditLog, MemoryAuditLog};
pub use crypto::{CryptoError, EncryptionKey};
pub use error::{Result, SecretError};
pub use service::SecretService;
pub use store::{FileSecretStore, MemorySecretStore, SecretStore};
pub use types::{
    AppId, CipherBundle, NewSecret, Principal, RevealedSecret, Role, SecretId, SecretListing,
    SecretRecord, SecretType,
};
