//! Document CLI commands.

use std::path::PathBuf;

use bytes::Bytes;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, FolderId, PageRequest};
use dochub_entity::document::{Document, DocumentFilter, VisibilityScope};
use dochub_service::{IngestRequest, RequestContext, Services, UpdateDocumentRequest};

/// Arguments for document commands
#[derive(Debug, Args)]
pub struct DocArgs {
    /// Document subcommand
    #[command(subcommand)]
    pub command: DocCommand,
}

/// Which documents to list
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Scope {
    /// Owned and shared
    All,
    /// Owned only
    Mine,
    /// Shared with you only
    Shared,
}

/// Document subcommands
#[derive(Debug, Subcommand)]
pub enum DocCommand {
    /// List visible documents
    List {
        /// Which documents
        #[arg(short, long, value_enum, default_value = "all")]
        scope: Scope,
        /// Only documents in this folder
        #[arg(long)]
        folder: Option<FolderId>,
        /// Search title and content
        #[arg(short, long)]
        query: Option<String>,
        /// Offset
        #[arg(long, default_value = "0")]
        offset: u64,
        /// Page size
        #[arg(long, default_value = "25")]
        limit: u64,
    },
    /// Upload a file
    Upload {
        /// File to upload
        file: PathBuf,
        /// Title (defaults to the file name)
        #[arg(short, long)]
        title: Option<String>,
        /// Place in this folder instead of classifying
        #[arg(long)]
        folder: Option<FolderId>,
        /// Read extracted text from this file
        #[arg(long)]
        text_file: Option<PathBuf>,
        /// MIME type
        #[arg(long)]
        mime: Option<String>,
    },
    /// Show a document
    Show {
        /// Document ID
        id: DocumentId,
    },
    /// Write a document's file to disk
    Download {
        /// Document ID
        id: DocumentId,
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Change a document's title
    Rename {
        /// Document ID
        id: DocumentId,
        /// New title
        #[arg(short, long)]
        title: String,
    },
    /// Move a document
    Move {
        /// Document ID
        id: DocumentId,
        /// Destination folder (omit to unfile)
        #[arg(long)]
        folder: Option<FolderId>,
    },
    /// Delete a document
    Delete {
        /// Document ID
        id: DocumentId,
    },
    /// Show recent activity
    Activity {
        /// Document ID
        id: DocumentId,
        /// Number of entries
        #[arg(short, long, default_value = "20")]
        limit: u64,
    },
}

/// Document display row
#[derive(Debug, Serialize, Tabled)]
struct DocRow {
    /// Document ID
    id: String,
    /// Title
    title: String,
    /// Folder
    folder: String,
    /// Size in bytes
    size: i64,
    /// Updated at
    updated_at: String,
}

impl From<&Document> for DocRow {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id.to_string(),
            title: d.title.clone(),
            folder: d.folder_id.map(|f| f.to_string()).unwrap_or_default(),
            size: d.size_bytes,
            updated_at: super::format_time(d.updated_at),
        }
    }
}

/// Activity display row
#[derive(Debug, Serialize, Tabled)]
struct ActivityRow {
    /// Kind
    kind: String,
    /// User
    user: String,
    /// When
    at: String,
}

/// Execute document commands
pub async fn execute(
    args: &DocArgs,
    services: &Services,
    ctx: &RequestContext,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        DocCommand::List {
            scope,
            folder,
            query,
            offset,
            limit,
        } => {
            let filter = DocumentFilter {
                scope: VisibilityScope::All,
                folder_id: *folder,
                query: query.clone(),
            };
            let page = PageRequest::new(*offset, *limit);
            let result = match scope {
                Scope::All => services.visibility.visible_documents(ctx, &filter, &page).await?,
                Scope::Mine => services.visibility.my_documents(ctx, &filter, &page).await?,
                Scope::Shared => services.visibility.shared_documents(ctx, &filter, &page).await?,
            };
            let rows: Vec<DocRow> = result.items.iter().map(DocRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Showing {} of {} (offset {})",
                    rows.len(),
                    result.total,
                    result.offset
                );
            }
        }
        DocCommand::Upload {
            file,
            title,
            folder,
            text_file,
            mime,
        } => {
            let data = tokio::fs::read(file).await?;
            let extracted_text = match text_file {
                Some(path) => Some(tokio::fs::read_to_string(path).await?),
                None => None,
            };
            let title = match title {
                Some(t) => t.clone(),
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| AppError::validation("Cannot derive a title from the path"))?,
            };

            let outcome = services
                .documents
                .ingest(
                    ctx,
                    IngestRequest {
                        title,
                        bytes: Some(Bytes::from(data)),
                        extracted_text,
                        requested_folder: *folder,
                        mime_type: mime.clone(),
                    },
                )
                .await?;

            output::print_success(&format!("Document uploaded ({})", outcome.document.id));
            match (outcome.classification.keyword(), outcome.document.folder_id) {
                (Some(keyword), Some(folder)) => {
                    println!("Routed to {folder} by rule '{keyword}'");
                }
                (None, Some(folder)) => println!("Placed in {folder}"),
                (_, None) => println!("Left unfiled"),
            }
        }
        DocCommand::Show { id } => {
            let doc = services.documents.get_document(ctx, *id).await?;
            output::print_item(&doc, format);
        }
        DocCommand::Download { id, output: path } => {
            let (doc, bytes) = services.documents.download(ctx, *id).await?;
            tokio::fs::write(path, &bytes).await?;
            output::print_success(&format!(
                "Wrote '{}' ({} bytes) to {}",
                doc.title,
                bytes.len(),
                path.display()
            ));
        }
        DocCommand::Rename { id, title } => {
            services
                .documents
                .update_document(
                    ctx,
                    *id,
                    UpdateDocumentRequest {
                        title: Some(title.clone()),
                        content: None,
                    },
                )
                .await?;
            output::print_success("Document renamed");
        }
        DocCommand::Move { id, folder } => {
            services.documents.move_document(ctx, *id, *folder).await?;
            output::print_success("Document moved");
        }
        DocCommand::Delete { id } => {
            services.documents.delete_document(ctx, *id).await?;
            output::print_success("Document deleted");
        }
        DocCommand::Activity { id, limit } => {
            let rows: Vec<ActivityRow> = services
                .documents
                .recent_activity(ctx, *id, *limit)
                .await?
                .iter()
                .map(|a| ActivityRow {
                    kind: a.kind.to_string(),
                    user: a.user_id.to_string(),
                    at: super::format_time(a.created_at),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
