//! Route an upload to a folder by matching its text against the
//! uploader's rules.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};
use dochub_database::store::RuleStore;
use dochub_entity::rule::{ClassificationRule, match_rules};

/// Outcome of classifying one upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    /// Folder the document should be placed in. `None` means unfiled.
    pub target_folder: Option<FolderId>,
    /// Whether a rule matched.
    pub matched: bool,
    /// The winning rule, if any.
    pub rule: Option<ClassificationRule>,
}

impl Classification {
    /// A placement chosen by the uploader.
    pub fn manual(folder: FolderId) -> Self {
        Self {
            target_folder: Some(folder),
            matched: false,
            rule: None,
        }
    }

    /// No folder; the document stays unfiled.
    pub fn unfiled() -> Self {
        Self::default()
    }

    /// The keyword of the winning rule.
    pub fn keyword(&self) -> Option<&str> {
        self.rule.as_ref().map(|r| r.keyword.as_str())
    }
}

/// Evaluates a user's active rules against extracted text.
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    rules: Arc<dyn RuleStore>,
}

impl ClassificationEngine {
    /// Creates a new classification engine.
    pub fn new(rules: Arc<dyn RuleStore>) -> Self {
        Self { rules }
    }

    /// Classify an upload.
    ///
    /// A manual folder always wins and no rules are consulted. Missing text
    /// is treated as empty and never matches.
    pub async fn classify(
        &self,
        text: Option<&str>,
        user: UserId,
        manual_folder: Option<FolderId>,
    ) -> AppResult<Classification> {
        if let Some(folder) = manual_folder {
            return Ok(Classification::manual(folder));
        }

        let text = text.unwrap_or_default();
        if text.trim().is_empty() {
            return Ok(Classification::unfiled());
        }

        let rules = self.rules.find_active_by_user(user).await?;
        let Some(rule) = match_rules(&rules, text) else {
            debug!(user_id = %user, rules = rules.len(), "No classification rule matched");
            return Ok(Classification::unfiled());
        };

        debug!(
            user_id = %user,
            rule_id = %rule.id,
            keyword = %rule.keyword,
            folder_id = %rule.target_folder_id,
            "Classification rule matched"
        );

        Ok(Classification {
            target_folder: Some(rule.target_folder_id),
            matched: true,
            rule: Some(rule.clone()),
        })
    }
}
