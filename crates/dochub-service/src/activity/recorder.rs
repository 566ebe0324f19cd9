//! Activity recorder.
//!
//! Recording never fails the operation that triggered it: errors are
//! logged and dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use dochub_core::types::{DocumentId, UserId};
use dochub_database::store::ActivityStore;
use dochub_entity::activity::ActivityKind;

/// Sink for document activity events.
#[async_trait]
pub trait ActivityRecorder: Send + Sync + std::fmt::Debug + 'static {
    /// Record that `user` did `kind` to `document`.
    async fn record(&self, document: DocumentId, user: UserId, kind: ActivityKind);
}

/// Recorder that appends to the activity table.
#[derive(Debug, Clone)]
pub struct StoreActivityRecorder {
    store: Arc<dyn ActivityStore>,
}

impl StoreActivityRecorder {
    /// Creates a new store-backed recorder.
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ActivityRecorder for StoreActivityRecorder {
    async fn record(&self, document: DocumentId, user: UserId, kind: ActivityKind) {
        // A deleted document has no row left to attach activity to.
        if kind == ActivityKind::Delete {
            info!(document_id = %document, user_id = %user, kind = %kind, "Document activity");
            return;
        }
        match self.store.record(document, user, kind).await {
            Ok(activity) => {
                debug!(activity_id = %activity.id, document_id = %document, kind = %kind, "Activity recorded");
            }
            Err(e) => {
                warn!(document_id = %document, user_id = %user, kind = %kind, error = %e, "Failed to record activity");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochub_database::MemoryStore;

    #[tokio::test]
    async fn test_missing_document_is_swallowed() {
        let store = MemoryStore::new();
        let recorder = StoreActivityRecorder::new(Arc::new(store.clone()));
        let doc = DocumentId::new();

        // No such document: the store rejects the row, the recorder logs it.
        recorder.record(doc, UserId::new(), ActivityKind::View).await;
        assert!(store.recent_for_document(doc, 10).await.unwrap().is_empty());
    }
}
