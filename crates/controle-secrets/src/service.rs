//! Secret operations: authorization, encryption, persistence, and audit.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::audit::{AuditAction, AuditEntry, AuditSink};
use crate::crypto::{self, EncryptionKey};
use crate::error::{Result, SecretError};
use crate::store::SecretStore;
use crate::types::{
    AppId, NewSecret, Principal, RevealedSecret, SecretId, SecretListing, SecretRecord,
};

/// Maximum allowed length for a secret label, in characters.
const MAX_LABEL_LEN: usize = 128;

/// Orchestrates every secret operation.
///
/// Holds the encryption key by value; the key is immutable after
/// construction and shared read-only across concurrent calls. Store and
/// audit sink are capabilities chosen by the caller at startup.
pub struct SecretService {
    key: EncryptionKey,
    store: Arc<dyn SecretStore>,
    audit: Arc<dyn AuditSink>,
}

impl SecretService {
    pub fn new(key: EncryptionKey, store: Arc<dyn SecretStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { key, store, audit }
    }

    /// Create a new secret. Requires an admin or editor principal.
    pub async fn create(&self, principal: &Principal, params: NewSecret) -> Result<SecretListing> {
        require(principal.role.can_write(), principal, "create secrets")?;
        validate_label(&params.label)?;
        validate_value(&params.value)?;

        let now = Utc::now();
        let bundle = crypto::encrypt(&self.key, &params.value)?;
        let record = SecretRecord {
            id: SecretId::new(),
            app_id: params.app_id,
            secret_type: params.secret_type,
            label: params.label,
            bundle,
            metadata: params.metadata,
            expires_at: params.expires_at,
            created_by: principal.email.clone(),
            created_at: now,
            updated_at: now,
        };

        let listing = SecretListing::from(&record);
        self.store.put(record).await?;
        debug!(id = %listing.id, app = %listing.app_id, "secret created");

        self.audit
            .record(
                AuditEntry::secret(AuditAction::Create, principal, listing.id).with_details(
                    json!({
                        "label": listing.label,
                        "secret_type": listing.secret_type,
                        "app_id": listing.app_id,
                    }),
                ),
            )
            .await;

        Ok(listing)
    }

    /// List secrets for an application. Any role may list.
    ///
    /// Listings carry metadata only; neither plaintext nor ciphertext.
    pub async fn list_for_app(
        &self,
        principal: &Principal,
        app_id: &AppId,
    ) -> Result<Vec<SecretListing>> {
        let records = self.store.list_for_app(app_id).await?;
        debug!(app = %app_id, count = records.len(), actor = %principal.email, "listed secrets");
        Ok(records.iter().map(SecretListing::from).collect())
    }

    /// Decrypt and return a secret's value. Admin only.
    ///
    /// Expired secrets are refused; the record stays in the store until
    /// deleted explicitly.
    pub async fn reveal(&self, principal: &Principal, id: SecretId) -> Result<RevealedSecret> {
        require(principal.role.can_reveal(), principal, "reveal secrets")?;

        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| SecretError::NotFound(id.to_string()))?;

        if record.is_expired() {
            return Err(SecretError::Expired);
        }

        let plaintext = crypto::decrypt(&self.key, &record.bundle)?;

        self.audit
            .record(
                AuditEntry::secret(AuditAction::View, principal, id).with_details(json!({
                    "label": record.label,
                })),
            )
            .await;

        Ok(RevealedSecret::new(plaintext))
    }

    /// Replace a secret's value. Requires an admin or editor principal.
    ///
    /// Always produces a brand-new cipher bundle with a fresh iv and tag;
    /// the old bundle is never edited in place.
    pub async fn update_value(
        &self,
        principal: &Principal,
        id: SecretId,
        new_value: &str,
    ) -> Result<SecretListing> {
        require(principal.role.can_write(), principal, "update secrets")?;
        validate_value(new_value)?;

        let mut record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| SecretError::NotFound(id.to_string()))?;

        record.bundle = crypto::encrypt(&self.key, new_value)?;
        record.updated_at = Utc::now();

        let listing = SecretListing::from(&record);
        self.store.put(record).await?;
        debug!(id = %id, "secret value replaced");

        self.audit
            .record(
                AuditEntry::secret(AuditAction::Update, principal, id).with_details(json!({
                    "label": listing.label,
                })),
            )
            .await;

        Ok(listing)
    }

    /// Delete a secret. Admin only.
    pub async fn delete(&self, principal: &Principal, id: SecretId) -> Result<()> {
        require(principal.role.can_delete(), principal, "delete secrets")?;

        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| SecretError::NotFound(id.to_string()))?;
        self.store.delete(id).await?;
        debug!(id = %id, "secret deleted");

        self.audit
            .record(
                AuditEntry::secret(AuditAction::Delete, principal, id).with_details(json!({
                    "label": record.label,
                    "app_id": record.app_id,
                })),
            )
            .await;

        Ok(())
    }
}

fn require(allowed: bool, principal: &Principal, operation: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(SecretError::AccessDenied {
            role: principal.role,
            operation: operation.to_string(),
        })
    }
}

/// Validate a secret label: non-empty, at most 128 characters.
fn validate_label(label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(SecretError::InvalidLabel(
            "label must not be empty".to_string(),
        ));
    }
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(SecretError::InvalidLabel(format!(
            "label exceeds maximum length of {MAX_LABEL_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SecretError::InvalidValue(
            "value must not be empty".to_string(),
        ));
    }
    Ok(())
}
