//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Get the Controle base directory (~/.controle).
///
/// Callers that honor a configured data-directory override should prefer
/// that value and fall back to this default.
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".controle"))
}

/// Get the secret records directory under a base directory.
pub fn secrets_dir(base: &Path) -> PathBuf {
    base.join("secrets")
}

/// Get the audit log directory under a base directory.
pub fn audit_dir(base: &Path) -> PathBuf {
    base.join("audit")
}

/// Ensure all required directories exist under a base directory.
pub fn ensure_dirs(base: &Path) -> Result<(), ConfigError> {
    let dirs = [base.to_path_buf(), secrets_dir(base), audit_dir(base)];

    for dir in dirs {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(())
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}
