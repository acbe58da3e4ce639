//! Secret management commands.
//!
//! Provides `controle secrets create|list|reveal|update|delete|token`
//! subcommands backed by the `controle-secrets` service layer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clap::Args;
use controle_secrets::{crypto, AppId, NewSecret, SecretId, SecretType};
use serde_json::Value;

use super::build_context;

/// Secrets command arguments.
#[derive(Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(clap::Subcommand)]
pub enum SecretsCommand {
    /// Encrypt and store a new secret
    Create {
        /// Application the secret belongs to
        #[arg(long)]
        app: String,

        /// Human-readable label
        #[arg(long)]
        label: String,

        /// Secret type (api_key, ssh_key, password, token, certificate, other)
        #[arg(long, default_value_t = SecretType::Other)]
        secret_type: SecretType,

        /// Secret value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,

        /// Expiry timestamp in RFC 3339, e.g. 2027-01-01T00:00:00Z
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,

        /// Additional metadata as KEY=VALUE (repeatable)
        #[arg(long = "meta")]
        meta: Vec<String>,
    },

    /// List secrets for an application (metadata only, no values)
    List {
        /// Application to list secrets for
        #[arg(long)]
        app: String,
    },

    /// Decrypt and print a secret value
    Reveal {
        /// Secret id
        id: SecretId,

        /// Print the SHA-256 fingerprint of the value instead of the value
        #[arg(long)]
        fingerprint: bool,
    },

    /// Replace a secret's value (re-encrypts with a fresh iv)
    Update {
        /// Secret id
        id: SecretId,

        /// New value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,
    },

    /// Delete a secret
    Delete {
        /// Secret id
        id: SecretId,
    },

    /// Generate a random hex token
    Token {
        /// Number of random bytes (output is twice as many hex characters)
        #[arg(long, default_value_t = 32)]
        bytes: usize,
    },
}

/// Run the secrets command.
pub async fn run(args: SecretsArgs) -> anyhow::Result<()> {
    match args.command {
        SecretsCommand::Create {
            app,
            label,
            secret_type,
            value,
            expires_at,
            meta,
        } => {
            let ctx = build_context()?;
            let value = read_value(value, &format!("Enter value for '{label}': "))?;
            let metadata = parse_metadata(&meta)?;

            let listing = ctx
                .service
                .create(
                    &ctx.operator,
                    NewSecret {
                        app_id: AppId::new(app),
                        secret_type,
                        label,
                        value,
                        metadata,
                        expires_at,
                    },
                )
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!("Secret '{}' stored with id {}.", listing.label, listing.id);
        }

        SecretsCommand::List { app } => {
            let ctx = build_context()?;
            let listings = ctx
                .service
                .list_for_app(&ctx.operator, &AppId::new(&app))
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            if listings.is_empty() {
                println!("No secrets stored for '{}'.", app);
            } else {
                println!("{:<36} {:<12} {:<23} {}", "ID", "TYPE", "UPDATED", "LABEL");
                println!("{}", "-".repeat(80));
                for s in &listings {
                    println!(
                        "{:<36} {:<12} {:<23} {}",
                        s.id,
                        s.secret_type,
                        s.updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        s.label
                    );
                }
                println!("\n{} secret(s) total.", listings.len());
            }
        }

        SecretsCommand::Reveal { id, fingerprint } => {
            let ctx = build_context()?;
            let revealed = match ctx.service.reveal(&ctx.operator, id).await {
                Ok(revealed) => revealed,
                Err(e) if e.is_integrity_failure() => {
                    anyhow::bail!(
                        "cannot decrypt secret {}: stored data failed its integrity check \
                         (wrong key or tampered record)",
                        id
                    );
                }
                Err(e) => return Err(anyhow::anyhow!("{}", e)),
            };

            if fingerprint {
                println!("{}", crypto::fingerprint(revealed.expose()));
            } else {
                println!("{}", revealed.expose());
            }
        }

        SecretsCommand::Update { id, value } => {
            let ctx = build_context()?;
            let value = read_value(value, &format!("Enter new value for {id}: "))?;

            ctx.service
                .update_value(&ctx.operator, id, &value)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!("Secret {} updated.", id);
        }

        SecretsCommand::Delete { id } => {
            let ctx = build_context()?;

            ctx.service
                .delete(&ctx.operator, id)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!("Secret {} deleted.", id);
        }

        SecretsCommand::Token { bytes } => {
            if bytes == 0 {
                anyhow::bail!("Token length must be at least 1 byte");
            }
            println!("{}", crypto::generate_token(bytes));
        }
    }

    Ok(())
}

/// Use the given value, or prompt for hidden input when absent.
fn read_value(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => rpassword::prompt_password(prompt)
            .map_err(|e| anyhow::anyhow!("Failed to read secret value: {}", e)),
    }
}

/// Parse repeated `KEY=VALUE` flags into a metadata map.
fn parse_metadata(pairs: &[String]) -> anyhow::Result<HashMap<String, Value>> {
    let mut metadata = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid metadata '{}': expected KEY=VALUE", pair))?;
        if key.is_empty() {
            anyhow::bail!("Invalid metadata '{}': key must not be empty", pair);
        }
        metadata.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(metadata)
}
