//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use dochub_core::config::AppConfig;
use dochub_core::result::AppResult;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check database connectivity
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> AppResult<()> {
    let pool = super::create_db_pool(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            dochub_database::migration::run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            if pool.health_check().await? {
                output::print_success("Database is reachable.");
            } else {
                output::print_warning("Database did not answer the health check.");
            }
        }
    }

    pool.close().await;
    Ok(())
}
