use async_trait::async_trait;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{RuleId, UserId};
use dochub_entity::rule::{ClassificationRule, CreateRule, UpdateRule, order_for_matching};

use super::{MemoryStore, Tables};
use crate::store::RuleStore;

impl Tables {
    fn keyword_taken(&self, user: UserId, keyword: &str, except: Option<RuleId>) -> bool {
        let wanted = keyword.to_lowercase();
        self.rules.values().any(|r| {
            r.user_id == user && r.keyword.to_lowercase() == wanted && Some(r.id) != except
        })
    }

    fn rules_of(&self, user: UserId, active_only: bool) -> Vec<ClassificationRule> {
        let mut rules: Vec<ClassificationRule> = self
            .rules
            .values()
            .filter(|r| r.user_id == user && (r.is_active || !active_only))
            .cloned()
            .collect();
        order_for_matching(&mut rules);
        rules
    }
}

#[async_trait]
impl RuleStore for MemoryStore {
    async fn find_by_id(&self, id: RuleId) -> AppResult<Option<ClassificationRule>> {
        Ok(self.tables.read().await.rules.get(&id).cloned())
    }

    async fn find_by_user(&self, user: UserId) -> AppResult<Vec<ClassificationRule>> {
        Ok(self.tables.read().await.rules_of(user, false))
    }

    async fn find_active_by_user(&self, user: UserId) -> AppResult<Vec<ClassificationRule>> {
        Ok(self.tables.read().await.rules_of(user, true))
    }

    async fn find_by_keyword(
        &self,
        user: UserId,
        keyword: &str,
    ) -> AppResult<Option<ClassificationRule>> {
        let wanted = keyword.to_lowercase();
        let t = self.tables.read().await;
        Ok(t.rules
            .values()
            .find(|r| r.user_id == user && r.keyword.to_lowercase() == wanted)
            .cloned())
    }

    async fn count_by_user(&self, user: UserId) -> AppResult<u64> {
        let t = self.tables.read().await;
        Ok(t.rules.values().filter(|r| r.user_id == user).count() as u64)
    }

    async fn create(&self, data: &CreateRule) -> AppResult<ClassificationRule> {
        let mut t = self.tables.write().await;
        if !t.folders.contains_key(&data.target_folder_id) {
            return Err(AppError::not_found("Target folder not found"));
        }
        if t.keyword_taken(data.user_id, &data.keyword, None) {
            return Err(AppError::conflict("A rule with this keyword already exists"));
        }

        let now = t.now();
        let rule = ClassificationRule {
            id: RuleId::new(),
            user_id: data.user_id,
            keyword: data.keyword.clone(),
            target_folder_id: data.target_folder_id,
            priority: data.priority,
            is_active: data.is_active,
            created_at: now,
            updated_at: now,
        };
        t.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn update(&self, id: RuleId, data: &UpdateRule) -> AppResult<ClassificationRule> {
        let mut t = self.tables.write().await;
        let Some(current) = t.rules.get(&id) else {
            return Err(AppError::not_found(format!("Rule {id} not found")));
        };
        if let Some(keyword) = &data.keyword {
            if t.keyword_taken(current.user_id, keyword, Some(id)) {
                return Err(AppError::conflict("A rule with this keyword already exists"));
            }
        }
        if let Some(target) = data.target_folder_id {
            if !t.folders.contains_key(&target) {
                return Err(AppError::not_found("Target folder not found"));
            }
        }

        let now = t.now();
        let rule = t
            .rules
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Rule {id} not found")))?;
        rule.apply(data);
        rule.updated_at = now;
        Ok(rule.clone())
    }

    async fn delete(&self, id: RuleId) -> AppResult<bool> {
        Ok(self.tables.write().await.rules.remove(&id).is_some())
    }
}
