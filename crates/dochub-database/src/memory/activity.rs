use async_trait::async_trait;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{ActivityId, DocumentId, UserId};
use dochub_entity::activity::{Activity, ActivityKind};

use super::MemoryStore;
use crate::store::ActivityStore;

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn record(
        &self,
        document: DocumentId,
        user: UserId,
        kind: ActivityKind,
    ) -> AppResult<Activity> {
        let mut t = self.tables.write().await;
        if !t.documents.contains_key(&document) {
            return Err(AppError::not_found(format!("Document {document} not found")));
        }
        let activity = Activity {
            id: ActivityId::new(),
            document_id: document,
            user_id: user,
            kind,
            created_at: t.now(),
        };
        t.activities.push(activity.clone());
        Ok(activity)
    }

    async fn recent_for_document(
        &self,
        document: DocumentId,
        limit: u64,
    ) -> AppResult<Vec<Activity>> {
        let t = self.tables.read().await;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        // Rows are appended in time order.
        Ok(t.activities
            .iter()
            .rev()
            .filter(|a| a.document_id == document)
            .take(limit)
            .cloned()
            .collect())
    }
}
