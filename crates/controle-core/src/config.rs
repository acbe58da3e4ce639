//! Environment-driven configuration with fail-fast validation.

use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::secret::SecretString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Minimum length of the encryption passphrase, in characters.
pub const MIN_ENCRYPTION_KEY_LEN: usize = 32;

/// Default operator email recorded in audit entries.
pub const DEFAULT_OPERATOR: &str = "operator@localhost";

/// Main Controle configuration.
///
/// Built from `CONTROLE_*` environment variables at startup. A configuration
/// that fails [`Config::validate`] must abort the process before any
/// encryption or storage operation runs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Passphrase the encryption key is derived from.
    pub encryption_key: SecretString,

    /// Which secret store backend to use.
    pub store: StoreBackend,

    /// Data directory override; defaults to ~/.controle when unset.
    pub data_dir: Option<PathBuf>,

    /// Email recorded as the acting operator in audit entries.
    pub operator_email: String,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Reads variables only; validation is a separate step so all
    /// violations can be reported together.
    pub fn from_env() -> Result<Self, ConfigError> {
        let encryption_key = env::get_var(vars::CONTROLE_ENCRYPTION_KEY)
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingVar(vars::CONTROLE_ENCRYPTION_KEY.to_string()))?;

        let store = env::get_var_or(vars::CONTROLE_STORE, "file").parse()?;

        let data_dir = env::get_var(vars::CONTROLE_DATA_DIR).map(PathBuf::from);

        let operator_email = env::get_var_or(vars::CONTROLE_OPERATOR, DEFAULT_OPERATOR);

        let config = Self {
            encryption_key,
            store,
            data_dir,
            operator_email,
        };
        tracing::debug!(store = %config.store, "configuration loaded from environment");
        Ok(config)
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Passphrase must meet the minimum length for key derivation
        if self.encryption_key.char_len() < MIN_ENCRYPTION_KEY_LEN {
            errors.push(format!(
                "{} must be at least {} characters, got {}",
                vars::CONTROLE_ENCRYPTION_KEY,
                MIN_ENCRYPTION_KEY_LEN,
                self.encryption_key.char_len()
            ));
        }

        // 2. Operator email must be present and plausibly an address
        if self.operator_email.is_empty() {
            errors.push("Operator email cannot be empty".to_string());
        } else if !self.operator_email.contains('@') {
            errors.push(format!(
                "Operator email '{}' is not a valid address",
                self.operator_email
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}

/// Secret store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory store, lost on process exit. Intended for tests and dry runs.
    Memory,
    /// One JSON file per record under the data directory.
    File,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(ConfigError::Validation(format!(
                "Unknown store backend '{}', expected 'memory' or 'file'",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::File => f.write_str("file"),
        }
    }
}
