//! The bundle of store handles injected into services.

use std::sync::Arc;

use sqlx::PgPool;

use crate::memory::MemoryStore;
use crate::repositories::{
    ActivityRepository, DocumentRepository, FolderRepository, GrantRepository, LabelRepository,
    RuleRepository,
};
use crate::store::{
    ActivityStore, DocumentStore, FolderStore, GrantStore, LabelStore, RuleStore,
};

/// One handle per table, all backed by the same database.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Folder nodes.
    pub folders: Arc<dyn FolderStore>,
    /// Permission grants.
    pub grants: Arc<dyn GrantStore>,
    /// Documents.
    pub documents: Arc<dyn DocumentStore>,
    /// Classification rules.
    pub rules: Arc<dyn RuleStore>,
    /// Labels and document links.
    pub labels: Arc<dyn LabelStore>,
    /// Document activity.
    pub activities: Arc<dyn ActivityStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            folders: Arc::new(FolderRepository::new(pool.clone())),
            grants: Arc::new(GrantRepository::new(pool.clone())),
            documents: Arc::new(DocumentRepository::new(pool.clone())),
            rules: Arc::new(RuleRepository::new(pool.clone())),
            labels: Arc::new(LabelRepository::new(pool.clone())),
            activities: Arc::new(ActivityRepository::new(pool)),
        }
    }

    /// Stores backed by a fresh [`MemoryStore`].
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Stores backed by an existing [`MemoryStore`].
    pub fn from_memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            folders: store.clone(),
            grants: store.clone(),
            documents: store.clone(),
            rules: store.clone(),
            labels: store.clone(),
            activities: store,
        }
    }
}
