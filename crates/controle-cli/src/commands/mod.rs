//! CLI command implementations.

pub mod audit;
pub mod secrets;

use std::sync::Arc;

use anyhow::Context as _;
use controle_core::{paths, Config, StoreBackend};
use controle_secrets::{
    AuditSink, EncryptionKey, FileAuditLog, FileSecretStore, MemoryAuditLog, MemorySecretStore,
    Principal, Role, SecretService, SecretStore,
};

/// Everything a command needs: the service, the audit sink it writes to,
/// and the principal the CLI acts as.
pub(crate) struct CliContext {
    pub service: SecretService,
    pub audit: Arc<dyn AuditSink>,
    pub operator: Principal,
}

/// Build the service from environment configuration.
///
/// Fails fast: an invalid configuration (missing or short passphrase,
/// unknown backend) aborts the command before any operation runs.
pub(crate) fn build_context() -> anyhow::Result<CliContext> {
    let config = Config::from_env().context("invalid configuration")?;
    config.validate().context("invalid configuration")?;

    let key = EncryptionKey::derive(&config.encryption_key).context("key derivation failed")?;

    let (store, audit): (Arc<dyn SecretStore>, Arc<dyn AuditSink>) = match config.store {
        StoreBackend::Memory => (
            Arc::new(MemorySecretStore::new()),
            Arc::new(MemoryAuditLog::new()),
        ),
        StoreBackend::File => {
            let base = match &config.data_dir {
                Some(dir) => dir.clone(),
                None => paths::base_dir()?,
            };
            paths::ensure_dirs(&base)?;
            (
                Arc::new(FileSecretStore::new(paths::secrets_dir(&base))),
                Arc::new(FileAuditLog::new(
                    paths::audit_dir(&base).join("audit.jsonl"),
                )),
            )
        }
    };

    let operator = Principal {
        id: "cli-operator".to_string(),
        email: config.operator_email,
        role: Role::Admin,
    };

    Ok(CliContext {
        service: SecretService::new(key, store, audit.clone()),
        audit,
        operator,
    })
}
