//! Secret record storage backends.
//!
//! Defines the [`SecretStore`] capability trait and two implementations:
//! [`MemorySecretStore`] for tests and dry runs, and [`FileSecretStore`],
//! which keeps one JSON file per record under the data directory. Stores
//! handle opaque records; encryption happens above this layer, so a store
//! never sees plaintext.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::types::{AppId, SecretId, SecretRecord};

/// Async trait for secret record storage backends.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Insert or replace a record.
    async fn put(&self, record: SecretRecord) -> Result<()>;

    /// Fetch a record by id.
    async fn get(&self, id: SecretId) -> Result<Option<SecretRecord>>;

    /// Remove a record by id, returning whether it existed.
    async fn delete(&self, id: SecretId) -> Result<bool>;

    /// List records belonging to an application, newest first.
    async fn list_for_app(&self, app_id: &AppId) -> Result<Vec<SecretRecord>>;
}

/// In-memory store; contents are lost when the process exits.
#[derive(Default)]
pub struct MemorySecretStore {
    records: RwLock<HashMap<SecretId, SecretRecord>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn put(&self, record: SecretRecord) -> Result<()> {
        self.records.write().await.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: SecretId) -> Result<Option<SecretRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: SecretId) -> Result<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn list_for_app(&self, app_id: &AppId) -> Result<Vec<SecretRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<SecretRecord> = records
            .values()
            .filter(|r| &r.app_id == app_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

/// A file-system-backed secret store.
///
/// Each record is stored as an individual JSON file at
/// `{base_dir}/{id}.json`. Files are created with mode `0600` on Unix and
/// the directory with `0700`.
pub struct FileSecretStore {
    base_dir: PathBuf,
}

impl FileSecretStore {
    /// Create a store rooted at `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Ensure the base directory exists with restrictive permissions.
    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            tokio::fs::set_permissions(&self.base_dir, perms).await?;
        }

        Ok(())
    }

    /// Resolve the path for a record file.
    fn record_path(&self, id: SecretId) -> PathBuf {
        self.base_dir.join(format!("{id}.json"))
    }
}

/// Write `data` to `path` with mode 0600 on Unix.
async fn write_record_file(path: &std::path::Path, data: &[u8]) -> Result<()> {
    tokio::fs::write(path, data).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(path, perms).await?;
    }

    Ok(())
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn put(&self, record: SecretRecord) -> Result<()> {
        self.ensure_dir().await?;

        let json = serde_json::to_string_pretty(&record)?;
        let path = self.record_path(record.id);
        debug!(id = %record.id, path = %path.display(), "writing secret record");
        write_record_file(&path, json.as_bytes()).await?;
        Ok(())
    }

    async fn get(&self, id: SecretId) -> Result<Option<SecretRecord>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let data = tokio::fs::read_to_string(&path).await?;
        let record: SecretRecord = serde_json::from_str(&data)?;
        Ok(Some(record))
    }

    async fn delete(&self, id: SecretId) -> Result<bool> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(false);
        }

        debug!(id = %id, path = %path.display(), "deleting secret record");
        tokio::fs::remove_file(&path).await?;
        Ok(true)
    }

    async fn list_for_app(&self, app_id: &AppId) -> Result<Vec<SecretRecord>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut matching = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.base_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match tokio::fs::read_to_string(&path).await {
                Ok(data) => match serde_json::from_str::<SecretRecord>(&data) {
                    Ok(record) => {
                        if &record.app_id == app_id {
                            matching.push(record);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "skipping malformed record file: {e}");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), "could not read record file: {e}");
                }
            }
        }

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}
