//! Folder repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, FolderId, UserId};
use dochub_entity::folder::{CascadePlan, CreateFolder, Folder};

use super::{is_foreign_key_violation, violates};
use crate::store::{CascadeOutcome, FolderStore};

const UNIQUE_NAME: &str = "folders_owner_parent_name_key";

/// Repository for folder CRUD, subtree loading and cascading deletes.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_err(e: sqlx::Error, name: &str, action: &str) -> AppError {
        if violates(&e, UNIQUE_NAME) {
            return AppError::conflict(format!("A folder named '{name}' already exists here"));
        }
        if is_foreign_key_violation(&e) {
            return AppError::not_found("Parent folder not found");
        }
        AppError::with_source(ErrorKind::Database, format!("Failed to {action} folder"), e)
    }
}

fn cascade_err(e: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&e) {
        AppError::conflict("Folder contents changed during delete; nothing was removed")
    } else {
        AppError::with_source(ErrorKind::Database, "Failed to delete folder tree", e)
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn find_by_name(
        &self,
        owner: UserId,
        parent: Option<FolderId>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND name = $3",
        )
        .bind(owner)
        .bind(parent)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find folder by name", e)
        })
    }

    async fn find_children(&self, parent: FolderId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id = $1 ORDER BY name ASC, id ASC",
        )
        .bind(parent)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn find_roots(&self, owner: UserId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id IS NULL \
             ORDER BY name ASC, id ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list root folders", e))
    }

    async fn find_subtree(&self, root: FolderId, max_depth: usize) -> AppResult<Vec<Folder>> {
        let depth = i32::try_from(max_depth).unwrap_or(i32::MAX);
        let folders = sqlx::query_as::<_, Folder>(
            "WITH RECURSIVE tree AS ( \
                SELECT f.*, 0 AS lvl FROM folders f WHERE f.id = $1 \
                UNION \
                SELECT c.*, t.lvl + 1 FROM folders c \
                INNER JOIN tree t ON c.parent_id = t.id WHERE t.lvl < $2 \
             ) SELECT DISTINCT ON (id) id, name, parent_id, owner_id, created_at, updated_at \
               FROM tree ORDER BY id",
        )
        .bind(root)
        .bind(depth)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load subtree", e))?;

        debug!(folder_id = %root, count = folders.len(), "Loaded folder subtree");
        Ok(folders)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, name, parent_id, owner_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(FolderId::new())
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_err(e, &data.name, "create"))
    }

    async fn rename(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_err(e, name, "rename"))?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn move_to(&self, id: FolderId, parent: Option<FolderId>) -> AppResult<Folder> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let name: Option<String> =
            sqlx::query_scalar("SELECT name FROM folders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to lock folder", e)
                })?;
        let Some(name) = name else {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        };

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_write_err(e, &name, "move"))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit folder move", e)
        })?;
        Ok(folder)
    }

    async fn count_children(&self, id: FolderId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count children", e)
            })?;
        Ok(count as u64)
    }

    async fn count_documents(&self, ids: &[FolderId]) -> AppResult<HashMap<FolderId, u64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(FolderId, i64)> = sqlx::query_as(
            "SELECT folder_id, COUNT(*) FROM documents \
             WHERE folder_id = ANY($1) GROUP BY folder_id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count documents", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count as u64))
            .collect())
    }

    async fn delete_cascade(&self, plan: &CascadePlan) -> AppResult<CascadeOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        let mut outcome = CascadeOutcome::default();

        for folder_id in &plan.order {
            let docs: Vec<(DocumentId, Option<String>)> = sqlx::query_as(
                "SELECT id, file_path FROM documents WHERE folder_id = $1 FOR UPDATE",
            )
            .bind(folder_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(cascade_err)?;

            if !docs.is_empty() {
                let doc_ids: Vec<DocumentId> = docs.iter().map(|(id, _)| *id).collect();

                sqlx::query("DELETE FROM document_labels WHERE document_id = ANY($1)")
                    .bind(&doc_ids)
                    .execute(&mut *tx)
                    .await
                    .map_err(cascade_err)?;
                sqlx::query("DELETE FROM document_activities WHERE document_id = ANY($1)")
                    .bind(&doc_ids)
                    .execute(&mut *tx)
                    .await
                    .map_err(cascade_err)?;
                let removed = sqlx::query("DELETE FROM documents WHERE id = ANY($1)")
                    .bind(&doc_ids)
                    .execute(&mut *tx)
                    .await
                    .map_err(cascade_err)?;

                outcome.documents_removed += removed.rows_affected();
                outcome
                    .file_paths
                    .extend(docs.into_iter().filter_map(|(_, path)| path));
            }

            let grants = sqlx::query("DELETE FROM folder_permissions WHERE folder_id = $1")
                .bind(folder_id)
                .execute(&mut *tx)
                .await
                .map_err(cascade_err)?;
            outcome.grants_removed += grants.rows_affected();

            let rules = sqlx::query("DELETE FROM classification_rules WHERE target_folder_id = $1")
                .bind(folder_id)
                .execute(&mut *tx)
                .await
                .map_err(cascade_err)?;
            outcome.rules_removed += rules.rows_affected();

            let folder = sqlx::query("DELETE FROM folders WHERE id = $1")
                .bind(folder_id)
                .execute(&mut *tx)
                .await
                .map_err(cascade_err)?;
            if folder.rows_affected() == 0 {
                // Dropping the transaction rolls back everything removed so far.
                return Err(AppError::conflict(format!(
                    "Folder {folder_id} disappeared during delete; nothing was removed"
                )));
            }
            outcome.folders_removed += 1;
        }

        tx.commit().await.map_err(cascade_err)?;

        debug!(
            folder_id = %plan.root,
            folders = outcome.folders_removed,
            documents = outcome.documents_removed,
            "Cascade committed"
        );
        Ok(outcome)
    }
}
