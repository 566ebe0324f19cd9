//! Classification rule repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::{RuleId, UserId};
use dochub_entity::rule::{ClassificationRule, CreateRule, UpdateRule};

use super::{is_foreign_key_violation, violates};
use crate::store::RuleStore;

const UNIQUE_KEYWORD: &str = "classification_rules_user_keyword_key";

/// Repository for per-user classification rules.
#[derive(Debug, Clone)]
pub struct RuleRepository {
    pool: PgPool,
}

impl RuleRepository {
    /// Create a new rule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_err(e: sqlx::Error, action: &str) -> AppError {
    if violates(&e, UNIQUE_KEYWORD) {
        AppError::conflict("A rule with this keyword already exists")
    } else if is_foreign_key_violation(&e) {
        AppError::not_found("Target folder not found")
    } else {
        AppError::with_source(ErrorKind::Database, format!("Failed to {action} rule"), e)
    }
}

#[async_trait]
impl RuleStore for RuleRepository {
    async fn find_by_id(&self, id: RuleId) -> AppResult<Option<ClassificationRule>> {
        sqlx::query_as::<_, ClassificationRule>("SELECT * FROM classification_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find rule", e))
    }

    async fn find_by_user(&self, user: UserId) -> AppResult<Vec<ClassificationRule>> {
        sqlx::query_as::<_, ClassificationRule>(
            "SELECT * FROM classification_rules WHERE user_id = $1 \
             ORDER BY priority DESC, created_at ASC, id ASC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list rules", e))
    }

    async fn find_active_by_user(&self, user: UserId) -> AppResult<Vec<ClassificationRule>> {
        sqlx::query_as::<_, ClassificationRule>(
            "SELECT * FROM classification_rules WHERE user_id = $1 AND is_active \
             ORDER BY priority DESC, created_at ASC, id ASC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list active rules", e))
    }

    async fn find_by_keyword(
        &self,
        user: UserId,
        keyword: &str,
    ) -> AppResult<Option<ClassificationRule>> {
        sqlx::query_as::<_, ClassificationRule>(
            "SELECT * FROM classification_rules WHERE user_id = $1 AND lower(keyword) = lower($2)",
        )
        .bind(user)
        .bind(keyword)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find rule by keyword", e)
        })
    }

    async fn count_by_user(&self, user: UserId) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM classification_rules WHERE user_id = $1")
                .bind(user)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count rules", e)
                })?;
        Ok(count as u64)
    }

    async fn create(&self, data: &CreateRule) -> AppResult<ClassificationRule> {
        sqlx::query_as::<_, ClassificationRule>(
            "INSERT INTO classification_rules \
             (id, user_id, keyword, target_folder_id, priority, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(RuleId::new())
        .bind(data.user_id)
        .bind(&data.keyword)
        .bind(data.target_folder_id)
        .bind(data.priority)
        .bind(data.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "create"))
    }

    async fn update(&self, id: RuleId, data: &UpdateRule) -> AppResult<ClassificationRule> {
        sqlx::query_as::<_, ClassificationRule>(
            "UPDATE classification_rules SET \
             keyword = COALESCE($2, keyword), \
             target_folder_id = COALESCE($3, target_folder_id), \
             priority = COALESCE($4, priority), \
             is_active = COALESCE($5, is_active), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.keyword)
        .bind(data.target_folder_id)
        .bind(data.priority)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "update"))?
        .ok_or_else(|| AppError::not_found(format!("Rule {id} not found")))
    }

    async fn delete(&self, id: RuleId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM classification_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete rule", e))?;
        Ok(result.rows_affected() > 0)
    }
}
