//! Classification rule entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, RuleId, UserId};

/// A per-user keyword rule that routes uploads into a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClassificationRule {
    /// Unique rule identifier.
    pub id: RuleId,
    /// The user whose uploads the rule applies to.
    pub user_id: UserId,
    /// Keyword matched case-insensitively against extracted text.
    pub keyword: String,
    /// Folder an upload lands in when the keyword matches.
    pub target_folder_id: FolderId,
    /// Higher priorities are tried first.
    pub priority: i32,
    /// Inactive rules are never matched.
    pub is_active: bool,
    /// Creation time; breaks priority ties (earliest wins).
    pub created_at: DateTime<Utc>,
    /// When the rule was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRule {
    /// Owning user.
    pub user_id: UserId,
    /// Keyword (already normalized).
    pub keyword: String,
    /// Target folder.
    pub target_folder_id: FolderId,
    /// Priority.
    pub priority: i32,
    /// Whether the rule starts active.
    pub is_active: bool,
}

/// Rule fields to change. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRule {
    /// New keyword.
    pub keyword: Option<String>,
    /// New target folder.
    pub target_folder_id: Option<FolderId>,
    /// New priority.
    pub priority: Option<i32>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl ClassificationRule {
    /// Apply an update in place and bump `updated_at`.
    pub fn apply(&mut self, update: &UpdateRule) {
        if let Some(keyword) = &update.keyword {
            self.keyword = keyword.clone();
        }
        if let Some(target) = update.target_folder_id {
            self.target_folder_id = target;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        self.updated_at = Utc::now();
    }
}

/// Trim a keyword and check it is non-empty and at most `max_len`
/// characters. Case is preserved; matching lower-cases both sides.
pub fn normalize_keyword(keyword: &str, max_len: usize) -> AppResult<String> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Keyword cannot be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "Keyword exceeds {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keyword() {
        assert_eq!(normalize_keyword("  Invoice ", 100).unwrap(), "Invoice");
        assert!(normalize_keyword(" ", 100).is_err());
        assert!(normalize_keyword("abcdef", 5).is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut rule = ClassificationRule {
            id: RuleId::new(),
            user_id: UserId::new(),
            keyword: "invoice".into(),
            target_folder_id: FolderId::new(),
            priority: 1,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let target = rule.target_folder_id;
        rule.apply(&UpdateRule {
            priority: Some(9),
            is_active: Some(false),
            ..UpdateRule::default()
        });
        assert_eq!(rule.priority, 9);
        assert!(!rule.is_active);
        assert_eq!(rule.keyword, "invoice");
        assert_eq!(rule.target_folder_id, target);
    }
}
