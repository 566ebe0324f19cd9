//! Grant repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};
use dochub_entity::folder::Folder;
use dochub_entity::permission::{Grant, GrantLevel, SharedFolder};

use super::is_foreign_key_violation;
use crate::store::GrantStore;

/// Repository for the `folder_permissions` table.
#[derive(Debug, Clone)]
pub struct GrantRepository {
    pool: PgPool,
}

impl GrantRepository {
    /// Create a new grant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SharedFolderRow {
    #[sqlx(flatten)]
    folder: Folder,
    level: GrantLevel,
}

#[async_trait]
impl GrantStore for GrantRepository {
    async fn find(&self, folder: FolderId, user: UserId) -> AppResult<Option<Grant>> {
        sqlx::query_as::<_, Grant>(
            "SELECT * FROM folder_permissions WHERE folder_id = $1 AND user_id = $2",
        )
        .bind(folder)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find grant", e))
    }

    async fn find_by_folder(&self, folder: FolderId) -> AppResult<Vec<Grant>> {
        sqlx::query_as::<_, Grant>(
            "SELECT * FROM folder_permissions WHERE folder_id = $1 ORDER BY created_at ASC",
        )
        .bind(folder)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list grants", e))
    }

    async fn levels_for(
        &self,
        user: UserId,
        folders: &[FolderId],
    ) -> AppResult<HashMap<FolderId, GrantLevel>> {
        if folders.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(FolderId, GrantLevel)> = sqlx::query_as(
            "SELECT folder_id, level FROM folder_permissions \
             WHERE user_id = $1 AND folder_id = ANY($2)",
        )
        .bind(user)
        .bind(folders)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load grant levels", e)
        })?;
        Ok(rows.into_iter().collect())
    }

    async fn upsert(
        &self,
        folder: FolderId,
        user: UserId,
        level: GrantLevel,
        granted_by: UserId,
    ) -> AppResult<Grant> {
        sqlx::query_as::<_, Grant>(
            "INSERT INTO folder_permissions (folder_id, user_id, level, granted_by) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (folder_id, user_id) DO UPDATE \
             SET level = EXCLUDED.level, granted_by = EXCLUDED.granted_by, updated_at = NOW() \
             RETURNING *",
        )
        .bind(folder)
        .bind(user)
        .bind(level)
        .bind(granted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found(format!("Folder {folder} not found"))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to save grant", e)
            }
        })
    }

    async fn update_level(
        &self,
        folder: FolderId,
        user: UserId,
        level: GrantLevel,
    ) -> AppResult<Option<Grant>> {
        sqlx::query_as::<_, Grant>(
            "UPDATE folder_permissions SET level = $3, updated_at = NOW() \
             WHERE folder_id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(folder)
        .bind(user)
        .bind(level)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update grant", e))
    }

    async fn delete(&self, folder: FolderId, user: UserId) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM folder_permissions WHERE folder_id = $1 AND user_id = $2")
                .bind(folder)
                .bind(user)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to revoke grant", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_shared_with(&self, user: UserId) -> AppResult<Vec<SharedFolder>> {
        let rows = sqlx::query_as::<_, SharedFolderRow>(
            "SELECT f.*, p.level FROM folders f \
             INNER JOIN folder_permissions p ON p.folder_id = f.id \
             WHERE p.user_id = $1 AND f.owner_id <> $1 \
             ORDER BY f.name ASC, f.id ASC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list shared folders", e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| SharedFolder {
                folder: row.folder,
                level: row.level,
            })
            .collect())
    }
}
