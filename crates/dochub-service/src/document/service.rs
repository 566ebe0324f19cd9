//! Document service: the upload entry point and the document lifecycle.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use dochub_auth::AccessResolver;
use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::traits::StorageProvider;
use dochub_core::types::{DocumentId, FolderId};
use dochub_database::store::{ActivityStore, DocumentStore, FolderStore};
use dochub_entity::activity::{Activity, ActivityKind};
use dochub_entity::document::{CreateDocument, Document, UpdateDocument, normalize_title};
use dochub_storage::document_path;

use super::access::DocumentAccess;
use crate::activity::ActivityRecorder;
use crate::classification::{Classification, ClassificationEngine};
use crate::cleanup::remove_files;
use crate::context::RequestContext;

/// Upper bound on activity rows returned per call.
const MAX_ACTIVITY_LIMIT: u64 = 200;

/// An upload handed over by the upload pipeline.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    /// Document title.
    pub title: String,
    /// Raw file bytes, if a file was uploaded.
    pub bytes: Option<Bytes>,
    /// Text extracted upstream. `None` when extraction failed or was skipped.
    pub extracted_text: Option<String>,
    /// Folder chosen by the uploader. Overrides classification.
    pub requested_folder: Option<FolderId>,
    /// MIME type reported by the client.
    pub mime_type: Option<String>,
}

/// Result of an ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// The stored document.
    pub document: Document,
    /// How its folder was chosen.
    pub classification: Classification,
}

/// Request to change a document's title or content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    /// New title.
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    /// New text content.
    pub content: Option<String>,
}

/// Orchestrates document ingestion and lifecycle operations.
#[derive(Debug, Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    folders: Arc<dyn FolderStore>,
    activities: Arc<dyn ActivityStore>,
    folder_access: Arc<AccessResolver>,
    document_access: Arc<DocumentAccess>,
    engine: Arc<ClassificationEngine>,
    storage: Arc<dyn StorageProvider>,
    recorder: Arc<dyn ActivityRecorder>,
}

impl DocumentService {
    /// Creates a new document service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        folders: Arc<dyn FolderStore>,
        activities: Arc<dyn ActivityStore>,
        folder_access: Arc<AccessResolver>,
        document_access: Arc<DocumentAccess>,
        engine: Arc<ClassificationEngine>,
        storage: Arc<dyn StorageProvider>,
        recorder: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            documents,
            folders,
            activities,
            folder_access,
            document_access,
            engine,
            storage,
            recorder,
        }
    }

    /// Store an upload, routing it to a folder first.
    ///
    /// A requested folder must be writable by the uploader. Without one the
    /// uploader's rules decide; a rule whose target folder has since
    /// disappeared is ignored and the document stays unfiled.
    pub async fn ingest(&self, ctx: &RequestContext, req: IngestRequest) -> AppResult<IngestOutcome> {
        let title = normalize_title(&req.title)?;

        if let Some(folder) = req.requested_folder {
            self.folder_access.require_write(folder, ctx.user_id).await?;
        }

        let mut classification = self
            .engine
            .classify(req.extracted_text.as_deref(), ctx.user_id, req.requested_folder)
            .await?;

        if classification.matched {
            if let Some(target) = classification.target_folder {
                if self.folders.find_by_id(target).await?.is_none() {
                    warn!(
                        user_id = %ctx.user_id,
                        folder_id = %target,
                        keyword = ?classification.keyword(),
                        "Rule target folder no longer exists"
                    );
                    classification = Classification::unfiled();
                }
            }
        }

        let id = DocumentId::new();
        let (file_path, size_bytes) = match &req.bytes {
            Some(bytes) => {
                let path = document_path(ctx.user_id, id);
                self.storage.write(&path, bytes.clone()).await?;
                (Some(path), bytes.len() as i64)
            }
            None => (None, 0),
        };

        let created = self
            .documents
            .create(&CreateDocument {
                id,
                title,
                owner_id: ctx.user_id,
                folder_id: classification.target_folder,
                content: req.extracted_text,
                file_path: file_path.clone(),
                mime_type: req.mime_type,
                size_bytes,
                auto_classified: classification.matched,
                classification_keyword: classification.keyword().map(str::to_string),
            })
            .await;

        let document = match created {
            Ok(doc) => doc,
            Err(e) => {
                if let Some(path) = file_path {
                    remove_files(self.storage.as_ref(), &[path]).await;
                }
                return Err(e);
            }
        };

        self.recorder
            .record(document.id, ctx.user_id, ActivityKind::Create)
            .await;

        info!(
            user_id = %ctx.user_id,
            document_id = %document.id,
            folder_id = ?document.folder_id,
            auto_classified = document.auto_classified,
            size = document.size_bytes,
            "Document ingested"
        );

        Ok(IngestOutcome {
            document,
            classification,
        })
    }

    /// Get a document the caller can see.
    pub async fn get_document(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<Document> {
        let (doc, _) = self.document_access.require_visible(id, ctx.user_id).await?;
        self.recorder.record(id, ctx.user_id, ActivityKind::View).await;
        Ok(doc)
    }

    /// Read the stored bytes of a document the caller can see.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
    ) -> AppResult<(Document, Bytes)> {
        let (doc, _) = self.document_access.require_visible(id, ctx.user_id).await?;
        let path = doc
            .file_path
            .as_deref()
            .ok_or_else(|| AppError::not_found("Document has no stored file"))?;
        let bytes = self.storage.read_bytes(path).await?;

        self.recorder
            .record(id, ctx.user_id, ActivityKind::Download)
            .await;
        Ok((doc, bytes))
    }

    /// Change the title or content. Owner or folder editor.
    pub async fn update_document(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        req: UpdateDocumentRequest,
    ) -> AppResult<Document> {
        req.validate()?;
        let current = self.document_access.require_edit(id, ctx.user_id).await?;

        let update = UpdateDocument {
            title: req.title.as_deref().map(normalize_title).transpose()?,
            content: req.content,
        };
        if update.is_empty() {
            return Ok(current);
        }

        let doc = self.documents.update(id, &update).await?;
        self.recorder.record(id, ctx.user_id, ActivityKind::Edit).await;

        info!(user_id = %ctx.user_id, document_id = %id, "Document updated");
        Ok(doc)
    }

    /// Move a document into `folder`, or out of any folder with `None`.
    ///
    /// The caller must be able to edit the document and write in the
    /// destination. Only the owner may unfile a document.
    pub async fn move_document(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        folder: Option<FolderId>,
    ) -> AppResult<Document> {
        let current = self.document_access.require_edit(id, ctx.user_id).await?;

        match folder {
            Some(dest) => {
                self.folder_access.require_write(dest, ctx.user_id).await?;
            }
            None if !current.is_owned_by(ctx.user_id) => {
                return Err(AppError::forbidden_role(
                    "Only the document owner can unfile a document",
                ));
            }
            None => {}
        }

        if current.folder_id == folder {
            return Ok(current);
        }

        let doc = self.documents.move_to(id, folder).await?;
        self.recorder.record(id, ctx.user_id, ActivityKind::Move).await;

        info!(
            user_id = %ctx.user_id,
            document_id = %id,
            from = ?current.folder_id,
            to = ?folder,
            "Document moved"
        );
        Ok(doc)
    }

    /// Delete a document the caller owns, then remove its file.
    pub async fn delete_document(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<()> {
        self.document_access.require_owner(id, ctx.user_id).await?;

        let removed = self
            .documents
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found_or_denied(format!("Document {id} not found")))?;

        if let Some(path) = removed.file_path {
            remove_files(self.storage.as_ref(), &[path]).await;
        }
        self.recorder
            .record(id, ctx.user_id, ActivityKind::Delete)
            .await;

        info!(user_id = %ctx.user_id, document_id = %id, "Document deleted");
        Ok(())
    }

    /// Recent activity on a document the caller can see, newest first.
    pub async fn recent_activity(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        limit: u64,
    ) -> AppResult<Vec<Activity>> {
        self.document_access.require_visible(id, ctx.user_id).await?;
        self.activities
            .recent_for_document(id, limit.clamp(1, MAX_ACTIVITY_LIMIT))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use dochub_core::config::AppConfig;
    use dochub_core::types::{RuleId, UserId};
    use dochub_database::Stores;
    use dochub_database::store::RuleStore;
    use dochub_entity::rule::{ClassificationRule, CreateRule, UpdateRule};
    use dochub_storage::LocalStorageProvider;

    use crate::Services;

    /// Always returns one rule pointing at a folder that does not exist.
    #[derive(Debug)]
    struct StaleRules(ClassificationRule);

    #[async_trait]
    impl RuleStore for StaleRules {
        async fn find_by_id(&self, _: RuleId) -> AppResult<Option<ClassificationRule>> {
            Ok(Some(self.0.clone()))
        }
        async fn find_by_user(&self, _: UserId) -> AppResult<Vec<ClassificationRule>> {
            Ok(vec![self.0.clone()])
        }
        async fn find_active_by_user(&self, _: UserId) -> AppResult<Vec<ClassificationRule>> {
            Ok(vec![self.0.clone()])
        }
        async fn find_by_keyword(
            &self,
            _: UserId,
            _: &str,
        ) -> AppResult<Option<ClassificationRule>> {
            Ok(None)
        }
        async fn count_by_user(&self, _: UserId) -> AppResult<u64> {
            Ok(1)
        }
        async fn create(&self, _: &CreateRule) -> AppResult<ClassificationRule> {
            Err(AppError::internal("read-only"))
        }
        async fn update(&self, _: RuleId, _: &UpdateRule) -> AppResult<ClassificationRule> {
            Err(AppError::internal("read-only"))
        }
        async fn delete(&self, _: RuleId) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_rule_with_vanished_target_leaves_document_unfiled() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap());
        let user = UserId::new();
        let now = Utc::now();
        let mut stores = Stores::memory();
        stores.rules = Arc::new(StaleRules(ClassificationRule {
            id: RuleId::new(),
            user_id: user,
            keyword: "invoice".into(),
            target_folder_id: FolderId::new(),
            priority: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
        }));
        let services = Services::new(stores, storage, &AppConfig::default());

        let outcome = services
            .documents
            .ingest(
                &RequestContext::new(user),
                IngestRequest {
                    title: "invoice.pdf".into(),
                    bytes: Some(Bytes::from_static(b"%PDF")),
                    extracted_text: Some("Invoice #9".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.document.folder_id, None);
        assert!(!outcome.classification.matched);
        assert!(!outcome.document.auto_classified);
        assert_eq!(outcome.document.size_bytes, 4);
    }
}
