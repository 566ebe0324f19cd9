//! Document repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, FolderId, PageRequest, PageResponse, UserId};
use dochub_entity::document::{
    CreateDocument, Document, DocumentFilter, UpdateDocument, VisibilityScope,
};

use super::{is_foreign_key_violation, to_i64};
use crate::store::DocumentStore;

/// Repository for documents and their link rows.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `%`, `_` and `\` so a user term matches literally under `ILIKE`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Append the visibility predicate and filters as a `WHERE` clause.
fn push_visibility(qb: &mut QueryBuilder<'_, Postgres>, user: UserId, filter: &DocumentFilter) {
    const GRANTED: &str = " EXISTS (SELECT 1 FROM folder_permissions p \
                           WHERE p.folder_id = d.folder_id AND p.user_id = ";

    match filter.scope {
        VisibilityScope::All => {
            qb.push(" WHERE (d.owner_id = ")
                .push_bind(user)
                .push(" OR (d.folder_id IS NOT NULL AND")
                .push(GRANTED)
                .push_bind(user)
                .push(")))");
        }
        VisibilityScope::Owned => {
            qb.push(" WHERE d.owner_id = ").push_bind(user);
        }
        VisibilityScope::Shared => {
            qb.push(" WHERE d.owner_id <> ")
                .push_bind(user)
                .push(" AND d.folder_id IS NOT NULL AND")
                .push(GRANTED)
                .push_bind(user)
                .push(")");
        }
    }

    if let Some(folder) = filter.folder_id {
        qb.push(" AND d.folder_id = ").push_bind(folder);
    }

    if let Some(term) = filter.search_term() {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (d.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR d.content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    async fn create(&self, data: &CreateDocument) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, title, owner_id, folder_id, content, file_path, \
             mime_type, size_bytes, auto_classified, classification_keyword) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(data.id)
        .bind(&data.title)
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(&data.content)
        .bind(&data.file_path)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(data.auto_classified)
        .bind(&data.classification_keyword)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("Target folder not found")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create document", e)
            }
        })
    }

    async fn update(&self, id: DocumentId, data: &UpdateDocument) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET title = COALESCE($2, title), \
             content = COALESCE($3, content), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update document", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    async fn move_to(&self, id: DocumentId, folder: Option<FolderId>) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET folder_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(folder)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("Destination folder not found")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to move document", e)
            }
        })?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    async fn delete(&self, id: DocumentId) -> AppResult<Option<Document>> {
        let db_err = |e: sqlx::Error| {
            AppError::with_source(ErrorKind::Database, "Failed to delete document", e)
        };
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM document_labels WHERE document_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM document_activities WHERE document_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let removed = sqlx::query_as::<_, Document>("DELETE FROM documents WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(removed)
    }

    async fn list_visible(
        &self,
        user: UserId,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents d");
        push_visibility(&mut count, user, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count documents", e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT d.* FROM documents d");
        push_visibility(&mut select, user, filter);
        select
            .push(" ORDER BY d.updated_at DESC, d.id ASC LIMIT ")
            .push_bind(to_i64(page.limit))
            .push(" OFFSET ")
            .push_bind(to_i64(page.offset));
        let items = select
            .build_query_as::<Document>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list documents", e)
            })?;

        Ok(PageResponse::new(items, page, total.max(0) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_shared_scope_sql() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT d.* FROM documents d");
        let filter = DocumentFilter {
            scope: VisibilityScope::Shared,
            folder_id: Some(FolderId::new()),
            query: Some("tax".into()),
        };
        push_visibility(&mut qb, UserId::new(), &filter);
        let sql = qb.sql();
        assert!(sql.contains("d.owner_id <> $1"));
        assert!(sql.contains("p.user_id = $2)"));
        assert!(sql.contains("d.folder_id = $3"));
        assert!(sql.contains("d.title ILIKE $4 OR d.content ILIKE $5"));
    }
}
