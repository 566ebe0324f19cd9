//! Folder sharing CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};
use dochub_entity::permission::GrantLevel;
use dochub_service::{RequestContext, Services};

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Share a folder with a user (updates the level if already shared)
    Grant {
        /// Folder ID
        folder_id: FolderId,
        /// Grantee user ID
        #[arg(short, long)]
        user: UserId,
        /// Level: viewer or editor
        #[arg(short, long, default_value = "viewer")]
        level: GrantLevel,
    },
    /// Change the level of an existing grant
    Update {
        /// Folder ID
        folder_id: FolderId,
        /// Grantee user ID
        #[arg(short, long)]
        user: UserId,
        /// Level: viewer or editor
        #[arg(short, long)]
        level: GrantLevel,
    },
    /// Revoke a grant
    Revoke {
        /// Folder ID
        folder_id: FolderId,
        /// Grantee user ID
        #[arg(short, long)]
        user: UserId,
    },
    /// List grants on a folder you own
    List {
        /// Folder ID
        folder_id: FolderId,
    },
    /// List folders shared with you
    Incoming,
}

/// Grant display row
#[derive(Debug, Serialize, Tabled)]
struct GrantRow {
    /// Folder ID
    folder: String,
    /// Folder name or grantee
    subject: String,
    /// Level
    level: String,
    /// Since
    since: String,
}

/// Execute share commands
pub async fn execute(
    args: &ShareArgs,
    services: &Services,
    ctx: &RequestContext,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ShareCommand::Grant {
            folder_id,
            user,
            level,
        } => {
            services
                .sharing
                .share_folder(ctx, *folder_id, *user, *level)
                .await?;
            output::print_success(&format!("Folder shared with {user} as {level}"));
        }
        ShareCommand::Update {
            folder_id,
            user,
            level,
        } => {
            services
                .sharing
                .update_level(ctx, *folder_id, *user, *level)
                .await?;
            output::print_success(&format!("{user} is now {level}"));
        }
        ShareCommand::Revoke { folder_id, user } => {
            services.sharing.revoke(ctx, *folder_id, *user).await?;
            output::print_success(&format!("Access revoked for {user}"));
        }
        ShareCommand::List { folder_id } => {
            let rows: Vec<GrantRow> = services
                .sharing
                .list_grants(ctx, *folder_id)
                .await?
                .iter()
                .map(|g| GrantRow {
                    folder: g.folder_id.to_string(),
                    subject: g.user_id.to_string(),
                    level: g.level.to_string(),
                    since: super::format_time(g.created_at),
                })
                .collect();
            output::print_list(&rows, format);
        }
        ShareCommand::Incoming => {
            let rows: Vec<GrantRow> = services
                .sharing
                .list_shared_with_me(ctx)
                .await?
                .iter()
                .map(|s| GrantRow {
                    folder: s.folder.id.to_string(),
                    subject: s.folder.name.clone(),
                    level: s.level.to_string(),
                    since: super::format_time(s.folder.created_at),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
