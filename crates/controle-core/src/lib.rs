//! # controle-core
//!
//! Core configuration and shared types for Controle.
//!
//! This crate provides the pieces every other Controle crate builds on:
//!
//! - **Configuration**: environment-driven settings with fail-fast validation
//! - **Secrets**: [`SecretString`], a zero-on-drop wrapper for sensitive values
//! - **Utilities**: path resolution and environment variable handling

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::{Config, StoreBackend, MIN_ENCRYPTION_KEY_LEN};
pub use error::ConfigError;
pub use secret::SecretString;
