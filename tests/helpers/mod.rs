//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use dochub_core::config::AppConfig;
use dochub_core::types::{FolderId, PageRequest, UserId};
use dochub_database::{MemoryStore, Stores};
use dochub_entity::document::{Document, DocumentFilter};
use dochub_entity::folder::Folder;
use dochub_service::{
    CreateFolderRequest, CreateRuleRequest, IngestOutcome, IngestRequest, RequestContext,
    Services,
};
use dochub_storage::LocalStorageProvider;

/// Test application context
pub struct TestApp {
    /// The wired service graph
    pub services: Services,
    /// Backing store, for direct assertions
    pub store: MemoryStore,
    /// File storage used by the services
    pub storage: Arc<LocalStorageProvider>,
    /// Keeps the storage root alive for the test's duration
    _storage_dir: TempDir,
}

impl TestApp {
    /// Create a new test application with an empty store
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a new test application with custom limits
    pub async fn with_config(config: AppConfig) -> Self {
        let storage_dir = TempDir::new().expect("Failed to create storage dir");
        let storage = Arc::new(
            LocalStorageProvider::new(storage_dir.path())
                .await
                .expect("Failed to init storage"),
        );
        let store = MemoryStore::new();
        let services = Services::new(
            Stores::from_memory(store.clone()),
            storage.clone(),
            &config,
        );

        Self {
            services,
            store,
            storage,
            _storage_dir: storage_dir,
        }
    }

    /// A fresh user context
    pub fn user(&self) -> RequestContext {
        RequestContext::new(UserId::new())
    }

    /// Create a folder, panicking on failure
    pub async fn folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent: Option<FolderId>,
    ) -> Folder {
        self.services
            .folders
            .create_folder(
                ctx,
                CreateFolderRequest {
                    name: name.to_string(),
                    parent_id: parent,
                },
            )
            .await
            .expect("Failed to create folder")
    }

    /// Upload a document with file bytes and extracted text
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        title: &str,
        text: Option<&str>,
        folder: Option<FolderId>,
    ) -> IngestOutcome {
        self.services
            .documents
            .ingest(
                ctx,
                IngestRequest {
                    title: title.to_string(),
                    bytes: Some(Bytes::from(format!("contents of {title}"))),
                    extracted_text: text.map(str::to_string),
                    requested_folder: folder,
                    mime_type: Some("application/pdf".to_string()),
                },
            )
            .await
            .expect("Failed to upload document")
    }

    /// Create a classification rule
    pub async fn rule(&self, ctx: &RequestContext, keyword: &str, target: FolderId, priority: i32) {
        self.services
            .rules
            .create_rule(
                ctx,
                CreateRuleRequest {
                    keyword: keyword.to_string(),
                    target_folder_id: target,
                    priority,
                    is_active: true,
                },
            )
            .await
            .expect("Failed to create rule");
    }

    /// Every document visible to a user
    pub async fn visible(&self, ctx: &RequestContext) -> Vec<Document> {
        self.services
            .visibility
            .visible_documents(ctx, &DocumentFilter::default(), &PageRequest::new(0, 200))
            .await
            .expect("Failed to list documents")
            .items
    }

    /// Walk parent links from `folder` and assert the walk ends at a root
    /// without revisiting anything
    pub async fn assert_acyclic(&self, ctx: &RequestContext, folder: FolderId) {
        let mut seen = std::collections::HashSet::new();
        let mut current = Some(folder);
        while let Some(id) = current {
            assert!(seen.insert(id), "parent chain revisits {id}");
            current = self
                .services
                .folders
                .get_folder(ctx, id)
                .await
                .expect("ancestor readable")
                .parent_id;
        }
    }
}
