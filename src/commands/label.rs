//! Label CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, LabelId};
use dochub_entity::label::Label;
use dochub_service::{CreateLabelRequest, RequestContext, Services};

/// Arguments for label commands
#[derive(Debug, Args)]
pub struct LabelArgs {
    /// Label subcommand
    #[command(subcommand)]
    pub command: LabelCommand,
}

/// Label subcommands
#[derive(Debug, Subcommand)]
pub enum LabelCommand {
    /// List your labels, or the labels on a document
    List {
        /// Document ID
        #[arg(short, long)]
        document: Option<DocumentId>,
    },
    /// Create a label
    Create {
        /// Label name
        #[arg(short, long)]
        name: String,
        /// Color as #rrggbb
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Delete a label
    Delete {
        /// Label ID
        id: LabelId,
    },
    /// Attach a label to a document
    Attach {
        /// Label ID
        id: LabelId,
        /// Document ID
        #[arg(short, long)]
        document: DocumentId,
    },
    /// Detach a label from a document
    Detach {
        /// Label ID
        id: LabelId,
        /// Document ID
        #[arg(short, long)]
        document: DocumentId,
    },
}

/// Label display row
#[derive(Debug, Serialize, Tabled)]
struct LabelRow {
    /// Label ID
    id: String,
    /// Name
    name: String,
    /// Color
    color: String,
}

impl From<&Label> for LabelRow {
    fn from(l: &Label) -> Self {
        Self {
            id: l.id.to_string(),
            name: l.name.clone(),
            color: l.color.clone().unwrap_or_default(),
        }
    }
}

/// Execute label commands
pub async fn execute(
    args: &LabelArgs,
    services: &Services,
    ctx: &RequestContext,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        LabelCommand::List { document } => {
            let labels = match document {
                Some(doc) => services.labels.labels_for_document(ctx, *doc).await?,
                None => services.labels.list_labels(ctx).await?,
            };
            let rows: Vec<LabelRow> = labels.iter().map(LabelRow::from).collect();
            output::print_list(&rows, format);
        }
        LabelCommand::Create { name, color } => {
            let label = services
                .labels
                .create_label(
                    ctx,
                    CreateLabelRequest {
                        name: name.clone(),
                        color: color.clone(),
                    },
                )
                .await?;
            output::print_success(&format!("Label '{}' created ({})", label.name, label.id));
        }
        LabelCommand::Delete { id } => {
            services.labels.delete_label(ctx, *id).await?;
            output::print_success("Label deleted");
        }
        LabelCommand::Attach { id, document } => {
            if services.labels.attach(ctx, *document, *id).await? {
                output::print_success("Label attached");
            } else {
                output::print_warning("Label was already attached");
            }
        }
        LabelCommand::Detach { id, document } => {
            if services.labels.detach(ctx, *document, *id).await? {
                output::print_success("Label detached");
            } else {
                output::print_warning("Label was not attached");
            }
        }
    }

    Ok(())
}
