//! Classification rule CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, RuleId};
use dochub_entity::rule::ClassificationRule;
use dochub_service::{CreateRuleRequest, RequestContext, Services, UpdateRuleRequest};

/// Arguments for rule commands
#[derive(Debug, Args)]
pub struct RuleArgs {
    /// Rule subcommand
    #[command(subcommand)]
    pub command: RuleCommand,
}

/// Rule subcommands
#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    /// List your rules in evaluation order
    List,
    /// Create a rule
    Create {
        /// Keyword to match (case-insensitive)
        #[arg(short, long)]
        keyword: String,
        /// Target folder ID
        #[arg(short, long)]
        target: FolderId,
        /// Priority (higher first)
        #[arg(short, long, default_value = "0")]
        priority: i32,
        /// Create the rule disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Update a rule
    Update {
        /// Rule ID
        id: RuleId,
        /// New keyword
        #[arg(short, long)]
        keyword: Option<String>,
        /// New target folder ID
        #[arg(short, long)]
        target: Option<FolderId>,
        /// New priority
        #[arg(short, long)]
        priority: Option<i32>,
    },
    /// Enable a rule
    Enable {
        /// Rule ID
        id: RuleId,
    },
    /// Disable a rule
    Disable {
        /// Rule ID
        id: RuleId,
    },
    /// Delete a rule
    Delete {
        /// Rule ID
        id: RuleId,
    },
    /// Show where a text would be routed
    Preview {
        /// Text to classify
        text: String,
    },
}

/// Rule display row
#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    /// Rule ID
    id: String,
    /// Keyword
    keyword: String,
    /// Target folder
    target: String,
    /// Priority
    priority: i32,
    /// Active
    active: bool,
}

impl From<&ClassificationRule> for RuleRow {
    fn from(r: &ClassificationRule) -> Self {
        Self {
            id: r.id.to_string(),
            keyword: r.keyword.clone(),
            target: r.target_folder_id.to_string(),
            priority: r.priority,
            active: r.is_active,
        }
    }
}

/// Execute rule commands
pub async fn execute(
    args: &RuleArgs,
    services: &Services,
    ctx: &RequestContext,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        RuleCommand::List => {
            let rows: Vec<RuleRow> = services
                .rules
                .list_rules(ctx)
                .await?
                .iter()
                .map(RuleRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        RuleCommand::Create {
            keyword,
            target,
            priority,
            disabled,
        } => {
            let rule = services
                .rules
                .create_rule(
                    ctx,
                    CreateRuleRequest {
                        keyword: keyword.clone(),
                        target_folder_id: *target,
                        priority: *priority,
                        is_active: !disabled,
                    },
                )
                .await?;
            output::print_success(&format!("Rule '{}' created ({})", rule.keyword, rule.id));
        }
        RuleCommand::Update {
            id,
            keyword,
            target,
            priority,
        } => {
            services
                .rules
                .update_rule(
                    ctx,
                    *id,
                    UpdateRuleRequest {
                        keyword: keyword.clone(),
                        target_folder_id: *target,
                        priority: *priority,
                        is_active: None,
                    },
                )
                .await?;
            output::print_success("Rule updated");
        }
        RuleCommand::Enable { id } => {
            services.rules.set_active(ctx, *id, true).await?;
            output::print_success("Rule enabled");
        }
        RuleCommand::Disable { id } => {
            services.rules.set_active(ctx, *id, false).await?;
            output::print_success("Rule disabled");
        }
        RuleCommand::Delete { id } => {
            services.rules.delete_rule(ctx, *id).await?;
            output::print_success("Rule deleted");
        }
        RuleCommand::Preview { text } => {
            let result = services.rules.preview(ctx, text).await?;
            match (format, result.target_folder) {
                (OutputFormat::Json, _) => output::print_item(&result, format),
                (OutputFormat::Table, Some(folder)) => println!(
                    "Matched '{}' → {folder}",
                    result.keyword().unwrap_or_default()
                ),
                (OutputFormat::Table, None) => println!("No rule matched; document stays unfiled"),
            }
        }
    }

    Ok(())
}
