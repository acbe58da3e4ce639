//! Core types for secret management.
//!
//! Records hold only ciphertext; the plaintext value exists in memory as a
//! [`RevealedSecret`] and nowhere else.

use chrono::{DateTime, Utc};
use controle_core::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier of a stored secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretId(Uuid);

impl SecretId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SecretId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SecretId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of the application a secret belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Category of a stored secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretType {
    ApiKey,
    SshKey,
    Password,
    Token,
    Certificate,
    #[default]
    Other,
}

impl SecretType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::SshKey => "ssh_key",
            Self::Password => "password",
            Self::Token => "token",
            Self::Certificate => "certificate",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_key" => Ok(Self::ApiKey),
            "ssh_key" => Ok(Self::SshKey),
            "password" => Ok(Self::Password),
            "token" => Ok(Self::Token),
            "certificate" => Ok(Self::Certificate),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown secret type: {other}")),
        }
    }
}

/// The persisted representation of one encrypted value.
///
/// All three fields are base64 strings. A bundle is immutable once created;
/// replacing a secret's value always produces a brand-new bundle with a
/// fresh iv and tag, never an in-place edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherBundle {
    /// AES-256-GCM ciphertext.
    pub encrypted_value: String,

    /// Per-encryption random initialization vector.
    pub iv: String,

    /// GCM authentication tag.
    pub auth_tag: String,
}

/// A stored secret: one cipher bundle plus descriptive metadata.
///
/// The plaintext value is never part of this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: SecretId,

    pub app_id: AppId,

    #[serde(default)]
    pub secret_type: SecretType,

    pub label: String,

    #[serde(flatten)]
    pub bundle: CipherBundle,

    /// Arbitrary key-value metadata attached by the creator.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Email of the principal that created the record.
    pub created_by: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl SecretRecord {
    /// Whether the secret's expiry, if any, has passed.
    pub fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(t) if t <= Utc::now())
    }
}

/// Metadata-only view of a stored secret.
///
/// Contains neither plaintext nor ciphertext, so it is safe to pass around,
/// log, or serialize. This is what list operations return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretListing {
    pub id: SecretId,
    pub app_id: AppId,
    pub secret_type: SecretType,
    pub label: String,
    pub metadata: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SecretRecord> for SecretListing {
    fn from(record: &SecretRecord) -> Self {
        Self {
            id: record.id,
            app_id: record.app_id.clone(),
            secret_type: record.secret_type,
            label: record.label.clone(),
            metadata: record.metadata.clone(),
            expires_at: record.expires_at,
            created_by: record.created_by.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// A decrypted secret value held in memory.
///
/// Wraps [`SecretString`] so the plaintext is zeroed on drop. Debug and
/// Display both emit `[REDACTED]`; reading the value requires an explicit
/// [`RevealedSecret::expose`] call.
pub struct RevealedSecret {
    inner: SecretString,
}

impl RevealedSecret {
    /// Create a new revealed secret from raw plaintext.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::new(value),
        }
    }

    /// Expose the plaintext value. Use sparingly.
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl fmt::Debug for RevealedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for RevealedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for RevealedSecret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Parameters for creating a new secret.
pub struct NewSecret {
    /// Application the secret belongs to.
    pub app_id: AppId,

    /// Category of the secret.
    pub secret_type: SecretType,

    /// Human-readable label (non-empty, max 128 characters).
    pub label: String,

    /// Plaintext value to encrypt and store.
    pub value: String,

    /// Arbitrary key-value metadata.
    pub metadata: HashMap<String, Value>,

    /// Optional expiry; reveal refuses the secret past this instant.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Access role of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    /// Whether this role can read back plaintext values.
    pub fn can_reveal(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role can create secrets or replace their values.
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }

    /// Whether this role can delete secrets.
    pub fn can_delete(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        };
        f.write_str(name)
    }
}

/// An authenticated actor performing secret operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: Role,
}
