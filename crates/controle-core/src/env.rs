//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Common environment variable names.
pub mod vars {
    /// Passphrase the encryption key is derived from (required, min 32 chars).
    pub const CONTROLE_ENCRYPTION_KEY: &str = "CONTROLE_ENCRYPTION_KEY";

    /// Secret store backend selection: "memory" or "file".
    pub const CONTROLE_STORE: &str = "CONTROLE_STORE";

    /// Data directory override (default ~/.controle).
    pub const CONTROLE_DATA_DIR: &str = "CONTROLE_DATA_DIR";

    /// Email recorded as the acting operator in audit entries.
    pub const CONTROLE_OPERATOR: &str = "CONTROLE_OPERATOR";
}
