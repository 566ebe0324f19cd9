//! Backend-neutral store traits.
//!
//! Each trait covers one table (plus its link tables where a mutation must
//! clean them up atomically). Both the PostgreSQL repositories and
//! [`MemoryStore`](crate::MemoryStore) implement every trait and share the
//! same uniqueness and atomicity guarantees.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dochub_core::result::AppResult;
use dochub_core::types::{
    DocumentId, FolderId, LabelId, PageRequest, PageResponse, RuleId, UserId,
};
use dochub_entity::activity::{Activity, ActivityKind};
use dochub_entity::document::{CreateDocument, Document, DocumentFilter, UpdateDocument};
use dochub_entity::folder::{CascadePlan, CreateFolder, Folder};
use dochub_entity::label::{CreateLabel, Label};
use dochub_entity::permission::{Grant, GrantLevel, SharedFolder};
use dochub_entity::rule::{ClassificationRule, CreateRule, UpdateRule};

/// Rows removed by a cascading folder delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    /// Folders removed, including the operation root.
    pub folders_removed: u64,
    /// Documents removed from any folder of the subtree.
    pub documents_removed: u64,
    /// Grants removed from any folder of the subtree.
    pub grants_removed: u64,
    /// Classification rules that targeted a removed folder.
    pub rules_removed: u64,
    /// Storage paths of removed documents, for best-effort file cleanup
    /// after commit.
    pub file_paths: Vec<String>,
}

/// Persistence for folder nodes.
#[async_trait]
pub trait FolderStore: Send + Sync + Debug + 'static {
    /// Find a folder by ID.
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Find the owner's folder called `name` under `parent` (exact match).
    async fn find_by_name(
        &self,
        owner: UserId,
        parent: Option<FolderId>,
        name: &str,
    ) -> AppResult<Option<Folder>>;

    /// Direct children of a folder, by name.
    async fn find_children(&self, parent: FolderId) -> AppResult<Vec<Folder>>;

    /// Root-level folders owned by `owner`, by name.
    async fn find_roots(&self, owner: UserId) -> AppResult<Vec<Folder>>;

    /// `root` and every folder below it, at most `max_depth` levels down.
    async fn find_subtree(&self, root: FolderId, max_depth: usize) -> AppResult<Vec<Folder>>;

    /// Insert a folder. A duplicate `(owner, parent, name)` is a conflict.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Change a folder's name. A duplicate in the same scope is a conflict.
    async fn rename(&self, id: FolderId, name: &str) -> AppResult<Folder>;

    /// Change a folder's parent. A duplicate in the new scope is a conflict.
    async fn move_to(&self, id: FolderId, parent: Option<FolderId>) -> AppResult<Folder>;

    /// Number of direct child folders.
    async fn count_children(&self, id: FolderId) -> AppResult<u64>;

    /// Number of documents directly in each of `ids` (absent means zero).
    async fn count_documents(&self, ids: &[FolderId]) -> AppResult<HashMap<FolderId, u64>>;

    /// Remove every folder in `plan` together with their documents, the
    /// documents' label and activity links, grants and rules targeting them.
    ///
    /// Runs atomically: either every row is removed or none is. If the
    /// subtree changed since the plan was built the whole delete fails with
    /// a conflict.
    async fn delete_cascade(&self, plan: &CascadePlan) -> AppResult<CascadeOutcome>;
}

/// Persistence for folder permission grants.
#[async_trait]
pub trait GrantStore: Send + Sync + Debug + 'static {
    /// The grant for `(folder, user)`, if any.
    async fn find(&self, folder: FolderId, user: UserId) -> AppResult<Option<Grant>>;

    /// All grants on a folder.
    async fn find_by_folder(&self, folder: FolderId) -> AppResult<Vec<Grant>>;

    /// The user's grant level on each of `folders` that has one.
    async fn levels_for(
        &self,
        user: UserId,
        folders: &[FolderId],
    ) -> AppResult<HashMap<FolderId, GrantLevel>>;

    /// Create the grant or update its level in place.
    async fn upsert(
        &self,
        folder: FolderId,
        user: UserId,
        level: GrantLevel,
        granted_by: UserId,
    ) -> AppResult<Grant>;

    /// Change the level of an existing grant. `None` if there is no grant.
    async fn update_level(
        &self,
        folder: FolderId,
        user: UserId,
        level: GrantLevel,
    ) -> AppResult<Option<Grant>>;

    /// Remove a grant. Returns `true` if one existed.
    async fn delete(&self, folder: FolderId, user: UserId) -> AppResult<bool>;

    /// Folders shared with `user`, with the granted level.
    async fn find_shared_with(&self, user: UserId) -> AppResult<Vec<SharedFolder>>;
}

/// Persistence for documents.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug + 'static {
    /// Find a document by ID.
    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<Document>>;

    /// Insert a document.
    async fn create(&self, data: &CreateDocument) -> AppResult<Document>;

    /// Change title and/or content.
    async fn update(&self, id: DocumentId, data: &UpdateDocument) -> AppResult<Document>;

    /// Change the containing folder.
    async fn move_to(&self, id: DocumentId, folder: Option<FolderId>) -> AppResult<Document>;

    /// Remove a document with its label and activity links, atomically.
    /// Returns the removed row, or `None` if it did not exist.
    async fn delete(&self, id: DocumentId) -> AppResult<Option<Document>>;

    /// One page of the documents `user` may see under `filter`, most
    /// recently updated first, with the total under the same predicate.
    async fn list_visible(
        &self,
        user: UserId,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>>;
}

/// Persistence for classification rules.
#[async_trait]
pub trait RuleStore: Send + Sync + Debug + 'static {
    /// Find a rule by ID.
    async fn find_by_id(&self, id: RuleId) -> AppResult<Option<ClassificationRule>>;

    /// All of a user's rules in evaluation order.
    async fn find_by_user(&self, user: UserId) -> AppResult<Vec<ClassificationRule>>;

    /// A user's active rules in evaluation order.
    async fn find_active_by_user(&self, user: UserId) -> AppResult<Vec<ClassificationRule>>;

    /// A user's rule whose keyword equals `keyword` ignoring case.
    async fn find_by_keyword(
        &self,
        user: UserId,
        keyword: &str,
    ) -> AppResult<Option<ClassificationRule>>;

    /// Number of rules a user owns.
    async fn count_by_user(&self, user: UserId) -> AppResult<u64>;

    /// Insert a rule. A case-insensitive duplicate keyword is a conflict.
    async fn create(&self, data: &CreateRule) -> AppResult<ClassificationRule>;

    /// Apply a partial update.
    async fn update(&self, id: RuleId, data: &UpdateRule) -> AppResult<ClassificationRule>;

    /// Remove a rule. Returns `true` if it existed.
    async fn delete(&self, id: RuleId) -> AppResult<bool>;
}

/// Persistence for labels and the document↔label link table.
#[async_trait]
pub trait LabelStore: Send + Sync + Debug + 'static {
    /// Find a label by ID.
    async fn find_by_id(&self, id: LabelId) -> AppResult<Option<Label>>;

    /// A user's labels by name.
    async fn find_by_owner(&self, owner: UserId) -> AppResult<Vec<Label>>;

    /// Insert a label. A duplicate name for the same owner is a conflict.
    async fn create(&self, data: &CreateLabel) -> AppResult<Label>;

    /// Remove a label and all its document links.
    async fn delete(&self, id: LabelId) -> AppResult<bool>;

    /// Link a label to a document. Returns `false` if already linked.
    async fn attach(&self, document: DocumentId, label: LabelId) -> AppResult<bool>;

    /// Unlink a label from a document. Returns `false` if not linked.
    async fn detach(&self, document: DocumentId, label: LabelId) -> AppResult<bool>;

    /// Labels linked to a document, by name.
    async fn find_by_document(&self, document: DocumentId) -> AppResult<Vec<Label>>;
}

/// Persistence for document activity records.
#[async_trait]
pub trait ActivityStore: Send + Sync + Debug + 'static {
    /// Append an activity row.
    async fn record(
        &self,
        document: DocumentId,
        user: UserId,
        kind: ActivityKind,
    ) -> AppResult<Activity>;

    /// The most recent activity on a document, newest first.
    async fn recent_for_document(
        &self,
        document: DocumentId,
        limit: u64,
    ) -> AppResult<Vec<Activity>>;
}
