//! Wiring for the whole service graph.

use std::sync::Arc;

use dochub_auth::AccessResolver;
use dochub_core::config::AppConfig;
use dochub_core::traits::StorageProvider;
use dochub_database::Stores;

use crate::activity::{ActivityRecorder, StoreActivityRecorder};
use crate::classification::{ClassificationEngine, RuleService};
use crate::document::{DocumentAccess, DocumentService, VisibilityIndex};
use crate::folder::{FolderService, TreeService};
use crate::label::LabelService;
use crate::share::SharingService;

/// Every service, sharing one set of stores and one access resolver.
#[derive(Debug, Clone)]
pub struct Services {
    /// Resolves effective folder access.
    pub access: Arc<AccessResolver>,
    /// Folder create, rename, move, delete and copy.
    pub folders: Arc<FolderService>,
    /// Folder subtrees and breadcrumbs.
    pub tree: Arc<TreeService>,
    /// Folder grants.
    pub sharing: Arc<SharingService>,
    /// Upload entry point and document lifecycle.
    pub documents: Arc<DocumentService>,
    /// Visible document listings.
    pub visibility: Arc<VisibilityIndex>,
    /// Rule evaluation.
    pub engine: Arc<ClassificationEngine>,
    /// Rule management.
    pub rules: Arc<RuleService>,
    /// Labels.
    pub labels: Arc<LabelService>,
}

impl Services {
    /// Build the service graph.
    pub fn new(stores: Stores, storage: Arc<dyn StorageProvider>, config: &AppConfig) -> Self {
        let access = Arc::new(AccessResolver::new(
            stores.folders.clone(),
            stores.grants.clone(),
        ));
        let document_access = Arc::new(DocumentAccess::new(
            stores.documents.clone(),
            stores.grants.clone(),
        ));
        let engine = Arc::new(ClassificationEngine::new(stores.rules.clone()));
        let recorder: Arc<dyn ActivityRecorder> =
            Arc::new(StoreActivityRecorder::new(stores.activities.clone()));

        let folders = Arc::new(FolderService::new(
            stores.folders.clone(),
            Arc::clone(&access),
            Arc::clone(&storage),
            config.tree.clone(),
        ));
        let tree = Arc::new(TreeService::new(
            stores.folders.clone(),
            Arc::clone(&access),
            config.tree.clone(),
        ));
        let sharing = Arc::new(SharingService::new(
            stores.grants.clone(),
            Arc::clone(&access),
        ));
        let documents = Arc::new(DocumentService::new(
            stores.documents.clone(),
            stores.folders.clone(),
            stores.activities.clone(),
            Arc::clone(&access),
            Arc::clone(&document_access),
            Arc::clone(&engine),
            storage,
            recorder,
        ));
        let visibility = Arc::new(VisibilityIndex::new(stores.documents.clone()));
        let rules = Arc::new(RuleService::new(
            stores.rules.clone(),
            Arc::clone(&access),
            Arc::clone(&engine),
            config.classification.clone(),
        ));
        let labels = Arc::new(LabelService::new(stores.labels, document_access));

        Self {
            access,
            folders,
            tree,
            sharing,
            documents,
            visibility,
            engine,
            rules,
            labels,
        }
    }
}
