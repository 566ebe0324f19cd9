//! In-memory implementation of every store trait.
//!
//! All tables live behind one `tokio::sync::RwLock`. Every mutation takes
//! the write lock once, validates, then applies, so readers observe either
//! the state before or after an operation and never a partial one. The
//! same unique keys the PostgreSQL schema enforces are checked here.

mod activity;
mod document;
mod folder;
mod grant;
mod label;
mod rule;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use dochub_core::types::{DocumentId, FolderId, LabelId, RuleId, UserId};
use dochub_entity::activity::Activity;
use dochub_entity::document::Document;
use dochub_entity::folder::Folder;
use dochub_entity::label::Label;
use dochub_entity::permission::Grant;
use dochub_entity::rule::ClassificationRule;

#[derive(Debug, Default)]
struct Tables {
    folders: HashMap<FolderId, Folder>,
    grants: HashMap<(FolderId, UserId), Grant>,
    documents: HashMap<DocumentId, Document>,
    rules: HashMap<RuleId, ClassificationRule>,
    labels: HashMap<LabelId, Label>,
    document_labels: HashSet<(DocumentId, LabelId)>,
    activities: Vec<Activity>,
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    /// Wall-clock time, nudged forward so successive writes never share a
    /// timestamp. Creation-order tie breaks depend on this.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.clock {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.clock = Some(now);
        now
    }

    fn name_taken(
        &self,
        owner: UserId,
        parent: Option<FolderId>,
        name: &str,
        except: Option<FolderId>,
    ) -> bool {
        self.folders.values().any(|f| {
            f.owner_id == owner
                && f.parent_id == parent
                && f.name == name
                && Some(f.id) != except
        })
    }
}

/// Process-local store holding every table in memory.
///
/// Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        ActivityStore, DocumentStore, FolderStore, GrantStore, LabelStore, RuleStore,
    };
    use dochub_core::ErrorKind;
    use dochub_core::types::PageRequest;
    use dochub_entity::activity::ActivityKind;
    use dochub_entity::document::{CreateDocument, DocumentFilter, VisibilityScope};
    use dochub_entity::folder::{CreateFolder, FolderArena};
    use dochub_entity::label::CreateLabel;
    use dochub_entity::permission::GrantLevel;
    use dochub_entity::rule::CreateRule;

    async fn folder(
        store: &MemoryStore,
        owner: UserId,
        parent: Option<FolderId>,
        name: &str,
    ) -> Folder {
        FolderStore::create(
            store,
            &CreateFolder {
                name: name.into(),
                parent_id: parent,
                owner_id: owner,
            },
        )
        .await
        .unwrap()
    }

    async fn document(store: &MemoryStore, owner: UserId, folder: Option<FolderId>) -> Document {
        DocumentStore::create(
            store,
            &CreateDocument {
                id: DocumentId::new(),
                title: "doc".into(),
                owner_id: owner,
                folder_id: folder,
                content: None,
                file_path: Some(format!("documents/{owner}/x")),
                mime_type: None,
                size_bytes: 0,
                auto_classified: false,
                classification_keyword: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_folder_names_unique_per_owner_and_parent() {
        let store = MemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let root = folder(&store, alice, None, "Reports").await;

        let dup = FolderStore::create(
            &store,
            &CreateFolder {
                name: "Reports".into(),
                parent_id: None,
                owner_id: alice,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(dup.kind, ErrorKind::Conflict);

        // Another owner, or another parent, is a different scope.
        folder(&store, bob, None, "Reports").await;
        folder(&store, alice, Some(root.id), "Reports").await;
        // Case-sensitive.
        folder(&store, alice, None, "reports").await;
    }

    #[tokio::test]
    async fn test_cascade_removes_every_linked_row() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let guest = UserId::new();
        let root = folder(&store, owner, None, "root").await;
        let child = folder(&store, owner, Some(root.id), "child").await;
        let doc = document(&store, owner, Some(child.id)).await;
        let keep = document(&store, owner, None).await;

        store.upsert(child.id, guest, GrantLevel::Viewer, owner).await.unwrap();
        store.upsert(root.id, guest, GrantLevel::Editor, owner).await.unwrap();
        let label = LabelStore::create(
            &store,
            &CreateLabel {
                owner_id: owner,
                name: "tax".into(),
                color: None,
            },
        )
        .await
        .unwrap();
        store.attach(doc.id, label.id).await.unwrap();
        store.record(doc.id, owner, ActivityKind::View).await.unwrap();
        RuleStore::create(
            &store,
            &CreateRule {
                user_id: owner,
                keyword: "invoice".into(),
                target_folder_id: child.id,
                priority: 1,
                is_active: true,
            },
        )
        .await
        .unwrap();

        let arena = FolderArena::new(store.find_subtree(root.id, 16).await.unwrap());
        let plan = arena.cascade_plan(root.id).unwrap();
        let outcome = store.delete_cascade(&plan).await.unwrap();

        assert_eq!(outcome.folders_removed, 2);
        assert_eq!(outcome.documents_removed, 1);
        assert_eq!(outcome.grants_removed, 2);
        assert_eq!(outcome.rules_removed, 1);
        assert_eq!(outcome.file_paths.len(), 1);

        let t = store.tables.read().await;
        assert!(t.folders.is_empty());
        assert!(t.grants.is_empty());
        assert!(t.rules.is_empty());
        assert!(t.document_labels.is_empty());
        assert!(t.activities.is_empty());
        assert_eq!(t.documents.len(), 1);
        assert!(t.documents.contains_key(&keep.id));
    }

    #[tokio::test]
    async fn test_stale_cascade_plan_removes_nothing() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let root = folder(&store, owner, None, "root").await;
        let arena = FolderArena::new(store.find_subtree(root.id, 16).await.unwrap());
        let plan = arena.cascade_plan(root.id).unwrap();

        // A child appears after the plan was built.
        folder(&store, owner, Some(root.id), "late").await;

        let err = store.delete_cascade(&plan).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(store.tables.read().await.folders.len(), 2);
    }

    #[tokio::test]
    async fn test_subtree_respects_depth_bound() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let a = folder(&store, owner, None, "a").await;
        let b = folder(&store, owner, Some(a.id), "b").await;
        folder(&store, owner, Some(b.id), "c").await;

        assert_eq!(store.find_subtree(a.id, 1).await.unwrap().len(), 2);
        assert_eq!(store.find_subtree(a.id, 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rule_keywords_unique_ignoring_case() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let target = folder(&store, owner, None, "Invoices").await;
        let data = CreateRule {
            user_id: owner,
            keyword: "Invoice".into(),
            target_folder_id: target.id,
            priority: 0,
            is_active: true,
        };
        RuleStore::create(&store, &data).await.unwrap();

        let dup = CreateRule {
            keyword: "INVOICE".into(),
            ..data
        };
        let err = RuleStore::create(&store, &dup).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_equal_priority_rules_keep_creation_order() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let target = folder(&store, owner, None, "t").await;
        for keyword in ["first", "second", "third"] {
            RuleStore::create(
                &store,
                &CreateRule {
                    user_id: owner,
                    keyword: keyword.into(),
                    target_folder_id: target.id,
                    priority: 5,
                    is_active: true,
                },
            )
            .await
            .unwrap();
        }
        let rules = store.find_active_by_user(owner).await.unwrap();
        let keywords: Vec<_> = rules.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keywords, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_visible_listing_is_deduplicated_and_paged() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let reader = UserId::new();
        let shared = folder(&store, owner, None, "shared").await;
        let private = folder(&store, owner, None, "private").await;
        store.upsert(shared.id, reader, GrantLevel::Viewer, owner).await.unwrap();

        for _ in 0..3 {
            document(&store, owner, Some(shared.id)).await;
        }
        document(&store, owner, Some(private.id)).await;
        let own = document(&store, reader, Some(shared.id)).await;

        let all = store
            .list_visible(reader, &DocumentFilter::default(), &PageRequest::new(0, 2))
            .await
            .unwrap();
        assert_eq!(all.total, 4);
        assert_eq!(all.items.len(), 2);
        // Newest first.
        assert_eq!(all.items[0].id, own.id);

        let shared_only = store
            .list_visible(
                reader,
                &DocumentFilter::scoped(VisibilityScope::Shared),
                &PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(shared_only.total, 3);
        assert!(shared_only.items.iter().all(|d| d.owner_id == owner));
    }
}
