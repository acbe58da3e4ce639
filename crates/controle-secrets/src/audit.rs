//! Audit trail for secret operations.
//!
//! Recording is fire-and-forget: sinks log their own failures and never
//! surface them to the operation that produced the entry. Entries carry
//! metadata only; plaintext and ciphertext are never written to the trail.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::Result;
use crate::types::{Principal, SecretId};

/// Action recorded in an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    View,
    Update,
    Delete,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::View => "view",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Timestamp.
    pub timestamp: DateTime<Utc>,

    /// Id of the acting principal.
    pub actor_id: String,

    /// Email of the acting principal.
    pub actor_email: String,

    /// What was done.
    pub action: AuditAction,

    /// Kind of resource acted on.
    pub resource_type: String,

    /// Id of the resource acted on.
    pub resource_id: String,

    /// Additional details.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,

    /// Hostname (if available).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl AuditEntry {
    /// Create a new entry for an operation on a secret.
    pub fn secret(action: AuditAction, actor: &Principal, id: SecretId) -> Self {
        Self {
            timestamp: Utc::now(),
            actor_id: actor.id.clone(),
            actor_email: actor.email.clone(),
            action,
            resource_type: "secret".to_string(),
            resource_id: id.to_string(),
            details: Value::Null,
            hostname: hostname::get().ok().map(|h| h.to_string_lossy().to_string()),
        }
    }

    /// Attach a details payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Destination for audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record an entry. Failures stay inside the sink.
    async fn record(&self, entry: AuditEntry);

    /// Return up to `limit` entries, newest first.
    async fn recent(&self, limit: usize) -> Vec<AuditEntry>;
}

/// In-memory audit log; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn record(&self, entry: AuditEntry) {
        self.entries.lock().await.push(entry);
    }

    async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock().await;
        entries.iter().rev().take(limit).cloned().collect()
    }
}

/// Append-only audit log, one JSON entry per line.
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    /// Create a log writing to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let line = serde_json::to_string(entry)?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl AuditSink for FileAuditLog {
    async fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.append(&entry).await {
            warn!(path = %self.path.display(), "failed to append audit entry: {e}");
        }
    }

    async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(_) => return Vec::new(),
        };

        let mut entries: Vec<AuditEntry> = Vec::new();
        for line in data.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(path = %self.path.display(), "skipping malformed audit line: {e}");
                }
            }
        }

        entries.reverse();
        entries.truncate(limit);
        entries
    }
}
