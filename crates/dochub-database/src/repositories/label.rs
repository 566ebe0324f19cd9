//! Label repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, LabelId, UserId};
use dochub_entity::label::{CreateLabel, Label};

use super::{is_foreign_key_violation, violates};
use crate::store::LabelStore;

/// Repository for labels and `document_labels` links.
#[derive(Debug, Clone)]
pub struct LabelRepository {
    pool: PgPool,
}

impl LabelRepository {
    /// Create a new label repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LabelStore for LabelRepository {
    async fn find_by_id(&self, id: LabelId) -> AppResult<Option<Label>> {
        sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find label", e))
    }

    async fn find_by_owner(&self, owner: UserId) -> AppResult<Vec<Label>> {
        sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE owner_id = $1 ORDER BY name ASC")
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list labels", e))
    }

    async fn create(&self, data: &CreateLabel) -> AppResult<Label> {
        sqlx::query_as::<_, Label>(
            "INSERT INTO labels (id, owner_id, name, color) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(LabelId::new())
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "labels_owner_name_key") {
                AppError::conflict(format!("Label '{}' already exists", data.name))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create label", e)
            }
        })
    }

    async fn delete(&self, id: LabelId) -> AppResult<bool> {
        let db_err = |e: sqlx::Error| {
            AppError::with_source(ErrorKind::Database, "Failed to delete label", e)
        };
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM document_labels WHERE label_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn attach(&self, document: DocumentId, label: LabelId) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO document_labels (document_id, label_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(document)
        .bind(label)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("Document or label not found")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to attach label", e)
            }
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn detach(&self, document: DocumentId, label: LabelId) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM document_labels WHERE document_id = $1 AND label_id = $2")
                .bind(document)
                .bind(label)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to detach label", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_document(&self, document: DocumentId) -> AppResult<Vec<Label>> {
        sqlx::query_as::<_, Label>(
            "SELECT l.* FROM labels l \
             INNER JOIN document_labels dl ON dl.label_id = l.id \
             WHERE dl.document_id = $1 ORDER BY l.name ASC",
        )
        .bind(document)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list document labels", e)
        })
    }
}
