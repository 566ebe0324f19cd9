use async_trait::async_trait;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, LabelId, UserId};
use dochub_entity::label::{CreateLabel, Label};

use super::MemoryStore;
use crate::store::LabelStore;

#[async_trait]
impl LabelStore for MemoryStore {
    async fn find_by_id(&self, id: LabelId) -> AppResult<Option<Label>> {
        Ok(self.tables.read().await.labels.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner: UserId) -> AppResult<Vec<Label>> {
        let t = self.tables.read().await;
        let mut labels: Vec<Label> = t
            .labels
            .values()
            .filter(|l| l.owner_id == owner)
            .cloned()
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(labels)
    }

    async fn create(&self, data: &CreateLabel) -> AppResult<Label> {
        let mut t = self.tables.write().await;
        if t
            .labels
            .values()
            .any(|l| l.owner_id == data.owner_id && l.name == data.name)
        {
            return Err(AppError::conflict(format!(
                "Label '{}' already exists",
                data.name
            )));
        }

        let label = Label {
            id: LabelId::new(),
            owner_id: data.owner_id,
            name: data.name.clone(),
            color: data.color.clone(),
            created_at: t.now(),
        };
        t.labels.insert(label.id, label.clone());
        Ok(label)
    }

    async fn delete(&self, id: LabelId) -> AppResult<bool> {
        let mut t = self.tables.write().await;
        let removed = t.labels.remove(&id).is_some();
        t.document_labels.retain(|(_, label)| *label != id);
        Ok(removed)
    }

    async fn attach(&self, document: DocumentId, label: LabelId) -> AppResult<bool> {
        let mut t = self.tables.write().await;
        if !t.documents.contains_key(&document) || !t.labels.contains_key(&label) {
            return Err(AppError::not_found("Document or label not found"));
        }
        Ok(t.document_labels.insert((document, label)))
    }

    async fn detach(&self, document: DocumentId, label: LabelId) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .document_labels
            .remove(&(document, label)))
    }

    async fn find_by_document(&self, document: DocumentId) -> AppResult<Vec<Label>> {
        let t = self.tables.read().await;
        let mut labels: Vec<Label> = t
            .document_labels
            .iter()
            .filter(|(doc, _)| *doc == document)
            .filter_map(|(_, label)| t.labels.get(label).cloned())
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(labels)
    }
}
