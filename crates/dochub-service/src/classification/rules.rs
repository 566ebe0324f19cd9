//! Classification rule management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use dochub_auth::AccessResolver;
use dochub_core::AppError;
use dochub_core::config::ClassificationConfig;
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, RuleId};
use dochub_database::store::RuleStore;
use dochub_entity::rule::{ClassificationRule, CreateRule, UpdateRule, normalize_keyword};

use super::engine::{Classification, ClassificationEngine};
use crate::context::RequestContext;

/// Request to create a rule.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRuleRequest {
    /// Keyword to look for in extracted text.
    #[validate(length(min = 1, max = 100))]
    pub keyword: String,
    /// Folder matching uploads are routed to.
    pub target_folder_id: FolderId,
    /// Higher priority rules are evaluated first.
    #[validate(range(min = -10000, max = 10000))]
    #[serde(default)]
    pub priority: i32,
    /// Inactive rules are kept but never match.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Request to update a rule. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRuleRequest {
    /// New keyword.
    #[validate(length(min = 1, max = 100))]
    pub keyword: Option<String>,
    /// New target folder.
    pub target_folder_id: Option<FolderId>,
    /// New priority.
    #[validate(range(min = -10000, max = 10000))]
    pub priority: Option<i32>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Manages a user's classification rules.
#[derive(Debug, Clone)]
pub struct RuleService {
    rules: Arc<dyn RuleStore>,
    access: Arc<AccessResolver>,
    engine: Arc<ClassificationEngine>,
    limits: ClassificationConfig,
}

impl RuleService {
    /// Creates a new rule service.
    pub fn new(
        rules: Arc<dyn RuleStore>,
        access: Arc<AccessResolver>,
        engine: Arc<ClassificationEngine>,
        limits: ClassificationConfig,
    ) -> Self {
        Self {
            rules,
            access,
            engine,
            limits,
        }
    }

    /// The caller's rules in evaluation order.
    pub async fn list_rules(&self, ctx: &RequestContext) -> AppResult<Vec<ClassificationRule>> {
        self.rules.find_by_user(ctx.user_id).await
    }

    /// Get one of the caller's rules.
    pub async fn get_rule(
        &self,
        ctx: &RequestContext,
        rule_id: RuleId,
    ) -> AppResult<ClassificationRule> {
        self.rules
            .find_by_id(rule_id)
            .await?
            .filter(|r| r.user_id == ctx.user_id)
            .ok_or_else(|| AppError::not_found(format!("Rule {rule_id} not found")))
    }

    /// Create a rule for the caller.
    ///
    /// The target folder must be writable by the caller now; it is not
    /// re-checked when the rule later matches.
    pub async fn create_rule(
        &self,
        ctx: &RequestContext,
        req: CreateRuleRequest,
    ) -> AppResult<ClassificationRule> {
        req.validate()?;
        let keyword = normalize_keyword(&req.keyword, self.limits.max_keyword_length)?;

        self.access
            .require_write(req.target_folder_id, ctx.user_id)
            .await?;

        let count = self.rules.count_by_user(ctx.user_id).await?;
        if count >= self.limits.max_rules_per_user as u64 {
            return Err(AppError::validation(format!(
                "Rule limit of {} reached",
                self.limits.max_rules_per_user
            )));
        }

        if self
            .rules
            .find_by_keyword(ctx.user_id, &keyword)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "A rule for keyword '{keyword}' already exists"
            )));
        }

        let rule = self
            .rules
            .create(&CreateRule {
                user_id: ctx.user_id,
                keyword,
                target_folder_id: req.target_folder_id,
                priority: req.priority,
                is_active: req.is_active,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            rule_id = %rule.id,
            keyword = %rule.keyword,
            folder_id = %rule.target_folder_id,
            priority = rule.priority,
            "Classification rule created"
        );

        Ok(rule)
    }

    /// Update one of the caller's rules.
    pub async fn update_rule(
        &self,
        ctx: &RequestContext,
        rule_id: RuleId,
        req: UpdateRuleRequest,
    ) -> AppResult<ClassificationRule> {
        req.validate()?;
        let current = self.get_rule(ctx, rule_id).await?;

        let keyword = match &req.keyword {
            Some(k) => {
                let k = normalize_keyword(k, self.limits.max_keyword_length)?;
                if let Some(other) = self.rules.find_by_keyword(ctx.user_id, &k).await? {
                    if other.id != current.id {
                        return Err(AppError::conflict(format!(
                            "A rule for keyword '{k}' already exists"
                        )));
                    }
                }
                Some(k)
            }
            None => None,
        };

        if let Some(target) = req.target_folder_id {
            if target != current.target_folder_id {
                self.access.require_write(target, ctx.user_id).await?;
            }
        }

        let rule = self
            .rules
            .update(
                rule_id,
                &UpdateRule {
                    keyword,
                    target_folder_id: req.target_folder_id,
                    priority: req.priority,
                    is_active: req.is_active,
                },
            )
            .await?;

        info!(user_id = %ctx.user_id, rule_id = %rule_id, "Classification rule updated");

        Ok(rule)
    }

    /// Enable or disable a rule.
    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        rule_id: RuleId,
        active: bool,
    ) -> AppResult<ClassificationRule> {
        self.update_rule(
            ctx,
            rule_id,
            UpdateRuleRequest {
                is_active: Some(active),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete one of the caller's rules.
    pub async fn delete_rule(&self, ctx: &RequestContext, rule_id: RuleId) -> AppResult<()> {
        self.get_rule(ctx, rule_id).await?;
        if !self.rules.delete(rule_id).await? {
            return Err(AppError::not_found(format!("Rule {rule_id} not found")));
        }

        info!(user_id = %ctx.user_id, rule_id = %rule_id, "Classification rule deleted");
        Ok(())
    }

    /// Run the caller's rules on `text` without storing anything.
    pub async fn preview(&self, ctx: &RequestContext, text: &str) -> AppResult<Classification> {
        self.engine.classify(Some(text), ctx.user_id, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochub_core::ErrorKind;
    use dochub_core::types::UserId;
    use dochub_database::Stores;
    use dochub_entity::folder::CreateFolder;

    async fn setup(max_rules: usize) -> (RuleService, FolderId, RequestContext) {
        let stores = Stores::memory();
        let access = Arc::new(AccessResolver::new(
            stores.folders.clone(),
            stores.grants.clone(),
        ));
        let engine = Arc::new(ClassificationEngine::new(stores.rules.clone()));
        let ctx = RequestContext::new(UserId::new());
        let folder = stores
            .folders
            .create(&CreateFolder {
                name: "Reports".into(),
                parent_id: None,
                owner_id: ctx.user_id,
            })
            .await
            .unwrap();
        let limits = ClassificationConfig {
            max_rules_per_user: max_rules,
            ..Default::default()
        };
        (
            RuleService::new(stores.rules, access, engine, limits),
            folder.id,
            ctx,
        )
    }

    fn request(keyword: &str, target: FolderId) -> CreateRuleRequest {
        CreateRuleRequest {
            keyword: keyword.into(),
            target_folder_id: target,
            priority: 10,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_duplicate_keyword_ignores_case() {
        let (rules, folder, ctx) = setup(10).await;
        rules.create_rule(&ctx, request("Invoice", folder)).await.unwrap();
        let err = rules
            .create_rule(&ctx, request("  INVOICE ", folder))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_target_must_be_writable() {
        let (rules, _, ctx) = setup(10).await;
        let err = rules
            .create_rule(&ctx, request("invoice", FolderId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFoundOrDenied);
    }

    #[tokio::test]
    async fn test_rule_cap() {
        let (rules, folder, ctx) = setup(1).await;
        rules.create_rule(&ctx, request("a", folder)).await.unwrap();
        let err = rules.create_rule(&ctx, request("b", folder)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_disabled_rule_does_not_preview() {
        let (rules, folder, ctx) = setup(10).await;
        let rule = rules.create_rule(&ctx, request("invoice", folder)).await.unwrap();
        assert!(rules.preview(&ctx, "Invoice #1").await.unwrap().matched);

        rules.set_active(&ctx, rule.id, false).await.unwrap();
        assert!(!rules.preview(&ctx, "Invoice #1").await.unwrap().matched);
    }

    #[tokio::test]
    async fn test_other_users_rule_is_not_found() {
        let (rules, folder, ctx) = setup(10).await;
        let rule = rules.create_rule(&ctx, request("invoice", folder)).await.unwrap();
        let stranger = RequestContext::new(UserId::new());
        let err = rules.delete_rule(&stranger, rule.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
