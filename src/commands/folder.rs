//! Folder tree CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use dochub_core::result::AppResult;
use dochub_core::types::FolderId;
use dochub_entity::folder::{Folder, FolderNode};
use dochub_service::{CopyFolderRequest, CreateFolderRequest, RequestContext, Services};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List root folders, or the children of a folder
    List {
        /// Parent folder ID (omit for your root folders)
        #[arg(short, long)]
        parent_id: Option<FolderId>,
    },
    /// Create a new folder
    Create {
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent_id: Option<FolderId>,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: FolderId,
        /// New name
        #[arg(short, long)]
        name: String,
    },
    /// Move a folder under a new parent
    Move {
        /// Folder ID
        id: FolderId,
        /// New parent folder ID (omit to move to root)
        #[arg(short, long)]
        parent_id: Option<FolderId>,
    },
    /// Copy a folder (creates a new, empty folder)
    Copy {
        /// Source folder ID
        id: FolderId,
        /// Destination parent folder ID
        #[arg(short, long)]
        parent_id: Option<FolderId>,
        /// Name of the copy
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Delete a folder
    Delete {
        /// Folder ID
        id: FolderId,
        /// Delete subfolders and documents too
        #[arg(long)]
        force: bool,
    },
    /// Show the folder tree under a folder
    Tree {
        /// Root folder ID
        id: FolderId,
    },
    /// Show the path from the outermost readable ancestor to a folder
    Path {
        /// Folder ID
        id: FolderId,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Parent
    parent: String,
    /// Owner
    owner: String,
    /// Created at
    created_at: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            parent: f.parent_id.map(|p| p.to_string()).unwrap_or_default(),
            owner: f.owner_id.to_string(),
            created_at: super::format_time(f.created_at),
        }
    }
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    services: &Services,
    ctx: &RequestContext,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        FolderCommand::List { parent_id } => {
            let folders = match parent_id {
                Some(parent) => services.folders.list_children(ctx, *parent).await?,
                None => services.folders.list_root_folders(ctx).await?,
            };
            let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Create { name, parent_id } => {
            let folder = services
                .folders
                .create_folder(
                    ctx,
                    CreateFolderRequest {
                        name: name.clone(),
                        parent_id: *parent_id,
                    },
                )
                .await?;
            output::print_success(&format!("Folder '{}' created ({})", folder.name, folder.id));
        }
        FolderCommand::Rename { id, name } => {
            let folder = services.folders.rename_folder(ctx, *id, name).await?;
            output::print_success(&format!("Folder renamed to '{}'", folder.name));
        }
        FolderCommand::Move { id, parent_id } => {
            services.folders.move_folder(ctx, *id, *parent_id).await?;
            output::print_success("Folder moved");
        }
        FolderCommand::Copy {
            id,
            parent_id,
            name,
        } => {
            let copy = services
                .folders
                .copy_folder(
                    ctx,
                    *id,
                    CopyFolderRequest {
                        destination_parent: *parent_id,
                        name: name.clone(),
                    },
                )
                .await?;
            output::print_success(&format!("Folder copied to '{}' ({})", copy.name, copy.id));
        }
        FolderCommand::Delete { id, force } => {
            let outcome = services.folders.delete_folder(ctx, *id, *force).await?;
            output::print_success(&format!(
                "Deleted {} folder(s) and {} document(s)",
                outcome.removed.folders_removed, outcome.removed.documents_removed
            ));
            if outcome.files_failed > 0 {
                output::print_warning(&format!(
                    "{} stored file(s) could not be removed",
                    outcome.files_failed
                ));
            }
        }
        FolderCommand::Tree { id } => {
            let tree = services.tree.get_tree(ctx, *id).await?;
            match format {
                OutputFormat::Table => print_tree(&tree),
                OutputFormat::Json => output::print_item(&tree, format),
            }
        }
        FolderCommand::Path { id } => {
            let trail = services.tree.breadcrumbs(ctx, *id).await?;
            match format {
                OutputFormat::Table => {
                    let names: Vec<&str> = trail.iter().map(|b| b.name.as_str()).collect();
                    println!("/{}", names.join("/"));
                }
                OutputFormat::Json => output::print_item(&trail, format),
            }
        }
    }

    Ok(())
}

fn print_tree(node: &FolderNode) {
    println!(
        "{}{} ({} document(s)) [{}]",
        "  ".repeat(node.depth),
        node.name,
        node.document_count,
        node.id
    );
    for child in &node.children {
        print_tree(child);
    }
}
