//! CLI command definitions and dispatch.

pub mod document;
pub mod folder;
pub mod label;
pub mod migrate;
pub mod rule;
pub mod share;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use dochub_core::AppError;
use dochub_core::config::AppConfig;
use dochub_core::result::AppResult;
use dochub_core::types::UserId;
use dochub_database::{DatabasePool, Stores};
use dochub_service::{RequestContext, Services};
use dochub_storage::LocalStorageProvider;

/// DocHub — multi-tenant document repository
#[derive(Debug, Parser)]
#[command(name = "dochub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Act on behalf of this user
    #[arg(long, global = true)]
    pub as_user: Option<UserId>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Folder tree management
    Folder(folder::FolderArgs),
    /// Folder sharing
    Share(share::ShareArgs),
    /// Classification rules
    Rule(rule::RuleArgs),
    /// Documents
    Doc(document::DocArgs),
    /// Labels
    Label(label::LabelArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        if let Commands::Migrate(args) = &self.command {
            return migrate::execute(args, &config).await;
        }

        let ctx = self.context()?;
        let services = build_services(&config).await?;

        match &self.command {
            Commands::Migrate(_) => Ok(()),
            Commands::Folder(args) => folder::execute(args, &services, &ctx, self.format).await,
            Commands::Share(args) => share::execute(args, &services, &ctx, self.format).await,
            Commands::Rule(args) => rule::execute(args, &services, &ctx, self.format).await,
            Commands::Doc(args) => document::execute(args, &services, &ctx, self.format).await,
            Commands::Label(args) => label::execute(args, &services, &ctx, self.format).await,
        }
    }

    fn context(&self) -> AppResult<RequestContext> {
        self.as_user
            .map(RequestContext::new)
            .ok_or_else(|| AppError::validation("--as-user is required for this command"))
    }
}

/// Helper: create the database pool from config
pub async fn create_db_pool(config: &AppConfig) -> AppResult<DatabasePool> {
    DatabasePool::connect(&config.database).await
}

/// Helper: wire the service graph against PostgreSQL and local storage
pub async fn build_services(config: &AppConfig) -> AppResult<Services> {
    let pool = create_db_pool(config).await?;
    let storage = Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
    Ok(Services::new(
        Stores::postgres(pool.pool().clone()),
        storage,
        config,
    ))
}

/// Helper: format a timestamp for table output
pub fn format_time(t: chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}
