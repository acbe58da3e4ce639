//! Shared helpers for Controle integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use controle_core::SecretString;
use controle_secrets::{
    EncryptionKey, FileAuditLog, FileSecretStore, Principal, Role, SecretService,
};

/// A passphrase that satisfies the 32-character minimum.
pub const TEST_PASSPHRASE: &str = "integration-test-passphrase-0123456789abcdef";

/// Build a file-backed service rooted at `base`, deriving its key from
/// `passphrase`.
///
/// Uses the same directory layout as the CLI: records under `secrets/`,
/// audit trail at `audit/audit.jsonl`.
pub fn file_service(base: &Path, passphrase: &str) -> SecretService {
    let key = EncryptionKey::derive(&SecretString::new(passphrase))
        .expect("key derivation should succeed");
    let store = Arc::new(FileSecretStore::new(base.join("secrets")));
    let audit = Arc::new(FileAuditLog::new(audit_log_path(base)));
    SecretService::new(key, store, audit)
}

/// Path of the audit trail file under a base directory.
pub fn audit_log_path(base: &Path) -> PathBuf {
    base.join("audit").join("audit.jsonl")
}

/// A test principal with the given role.
pub fn principal(role: Role) -> Principal {
    Principal {
        id: format!("it-{role}"),
        email: format!("{role}@example.com"),
        role,
    }
}
