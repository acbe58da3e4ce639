//! Audit trail commands.

use clap::Args;

use super::build_context;

/// Audit command arguments.
#[derive(Args)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(clap::Subcommand)]
pub enum AuditCommand {
    /// Show recent audit entries, newest first
    List {
        /// Maximum number of entries to show
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

/// Run the audit command.
pub async fn run(args: AuditArgs) -> anyhow::Result<()> {
    match args.command {
        AuditCommand::List { limit } => {
            let ctx = build_context()?;
            let entries = ctx.audit.recent(limit).await;

            if entries.is_empty() {
                println!("No audit entries recorded.");
            } else {
                println!(
                    "{:<23} {:<8} {:<36} {}",
                    "TIMESTAMP", "ACTION", "RESOURCE", "ACTOR"
                );
                println!("{}", "-".repeat(92));
                for entry in &entries {
                    println!(
                        "{:<23} {:<8} {:<36} {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                        entry.action,
                        entry.resource_id,
                        entry.actor_email
                    );
                }
                println!("\n{} entry(s) total.", entries.len());
            }
        }
    }

    Ok(())
}
