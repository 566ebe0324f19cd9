use std::collections::HashSet;

use async_trait::async_trait;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, FolderId, PageRequest, PageResponse, UserId};
use dochub_entity::document::{CreateDocument, Document, DocumentFilter, UpdateDocument};

use super::MemoryStore;
use crate::store::DocumentStore;

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<Document>> {
        Ok(self.tables.read().await.documents.get(&id).cloned())
    }

    async fn create(&self, data: &CreateDocument) -> AppResult<Document> {
        let mut t = self.tables.write().await;
        if let Some(folder) = data.folder_id {
            if !t.folders.contains_key(&folder) {
                return Err(AppError::not_found("Target folder not found"));
            }
        }
        if t.documents.contains_key(&data.id) {
            return Err(AppError::conflict(format!(
                "Document {} already exists",
                data.id
            )));
        }

        let now = t.now();
        let doc = Document {
            id: data.id,
            title: data.title.clone(),
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            content: data.content.clone(),
            file_path: data.file_path.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            auto_classified: data.auto_classified,
            classification_keyword: data.classification_keyword.clone(),
            created_at: now,
            updated_at: now,
        };
        t.documents.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn update(&self, id: DocumentId, data: &UpdateDocument) -> AppResult<Document> {
        let mut t = self.tables.write().await;
        let now = t.now();
        let doc = t
            .documents
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;
        if let Some(title) = &data.title {
            doc.title = title.clone();
        }
        if let Some(content) = &data.content {
            doc.content = Some(content.clone());
        }
        doc.updated_at = now;
        Ok(doc.clone())
    }

    async fn move_to(&self, id: DocumentId, folder: Option<FolderId>) -> AppResult<Document> {
        let mut t = self.tables.write().await;
        if let Some(folder) = folder {
            if !t.folders.contains_key(&folder) {
                return Err(AppError::not_found("Destination folder not found"));
            }
        }
        let now = t.now();
        let doc = t
            .documents
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;
        doc.folder_id = folder;
        doc.updated_at = now;
        Ok(doc.clone())
    }

    async fn delete(&self, id: DocumentId) -> AppResult<Option<Document>> {
        let mut t = self.tables.write().await;
        let removed = t.documents.remove(&id);
        if removed.is_some() {
            t.document_labels.retain(|(doc, _)| *doc != id);
            t.activities.retain(|a| a.document_id != id);
        }
        Ok(removed)
    }

    async fn list_visible(
        &self,
        user: UserId,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let t = self.tables.read().await;

        let mut seen = HashSet::new();
        let mut matching: Vec<&Document> = t
            .documents
            .values()
            .filter(|doc| {
                let grant = doc
                    .folder_id
                    .and_then(|f| t.grants.get(&(f, user)))
                    .map(|g| g.level);
                filter.matches(doc, user, grant)
            })
            .filter(|doc| seen.insert(doc.id))
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let (start, end) = page.bounds(matching.len());
        let items = matching[start..end].iter().map(|d| (*d).clone()).collect();
        Ok(PageResponse::new(items, page, total))
    }
}
