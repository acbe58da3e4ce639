//! Controle command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};

/// Controle - encrypted secret management
#[derive(Parser)]
#[command(name = "controle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage encrypted secrets
    Secrets(commands::secrets::SecretsArgs),

    /// Inspect the audit trail
    Audit(commands::audit::AuditArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Secrets(args) => commands::secrets::run(args).await,
        Commands::Audit(args) => commands::audit::run(args).await,
        Commands::Version => {
            println!("controle {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
