//! Activity repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::{ActivityId, DocumentId, UserId};
use dochub_entity::activity::{Activity, ActivityKind};

use super::to_i64;
use crate::store::ActivityStore;

/// Repository for the `document_activities` table.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn record(
        &self,
        document: DocumentId,
        user: UserId,
        kind: ActivityKind,
    ) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(
            "INSERT INTO document_activities (id, document_id, user_id, kind) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(ActivityId::new())
        .bind(document)
        .bind(user)
        .bind(kind)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record activity", e))
    }

    async fn recent_for_document(
        &self,
        document: DocumentId,
        limit: u64,
    ) -> AppResult<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM document_activities WHERE document_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(document)
        .bind(to_i64(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list activity", e))
    }
}
