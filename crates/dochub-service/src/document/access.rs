//! Per-document access derived from document ownership and folder grants.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, UserId};
use dochub_database::store::{DocumentStore, GrantStore};
use dochub_entity::document::{Document, is_visible};
use dochub_entity::permission::GrantLevel;

/// What a user may do with a document they can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentRole {
    /// Visible through a viewer grant on its folder.
    Viewer,
    /// Visible through an editor grant on its folder.
    Editor,
    /// Owns the document.
    Owner,
}

impl DocumentRole {
    /// Whether the role may change title, content, labels or placement.
    pub fn can_edit(&self) -> bool {
        matches!(self, Self::Editor | Self::Owner)
    }
}

/// Loads documents and checks the caller's role on them.
///
/// A document the caller cannot see is reported exactly like a missing one.
#[derive(Debug, Clone)]
pub struct DocumentAccess {
    documents: Arc<dyn DocumentStore>,
    grants: Arc<dyn GrantStore>,
}

impl DocumentAccess {
    /// Creates a new document access checker.
    pub fn new(documents: Arc<dyn DocumentStore>, grants: Arc<dyn GrantStore>) -> Self {
        Self { documents, grants }
    }

    /// The caller's role on a loaded document, or `None` if it is hidden.
    pub async fn role_on(&self, doc: &Document, user: UserId) -> AppResult<Option<DocumentRole>> {
        if doc.is_owned_by(user) {
            return Ok(Some(DocumentRole::Owner));
        }
        let grant = match doc.folder_id {
            Some(folder) => self.grants.find(folder, user).await?.map(|g| g.level),
            None => None,
        };
        if !is_visible(doc, user, grant) {
            return Ok(None);
        }
        Ok(grant.map(|level| match level {
            GrantLevel::Viewer => DocumentRole::Viewer,
            GrantLevel::Editor => DocumentRole::Editor,
        }))
    }

    /// Load a document the caller can see.
    pub async fn require_visible(
        &self,
        id: DocumentId,
        user: UserId,
    ) -> AppResult<(Document, DocumentRole)> {
        let hidden = || AppError::not_found_or_denied(format!("Document {id} not found"));
        let doc = self.documents.find_by_id(id).await?.ok_or_else(hidden)?;
        let role = self.role_on(&doc, user).await?.ok_or_else(hidden)?;
        Ok((doc, role))
    }

    /// Load a document the caller may edit.
    pub async fn require_edit(&self, id: DocumentId, user: UserId) -> AppResult<Document> {
        let (doc, role) = self.require_visible(id, user).await?;
        if !role.can_edit() {
            return Err(AppError::forbidden_role(
                "Editor access is required for this document",
            ));
        }
        Ok(doc)
    }

    /// Load a document the caller owns.
    pub async fn require_owner(&self, id: DocumentId, user: UserId) -> AppResult<Document> {
        let (doc, role) = self.require_visible(id, user).await?;
        if role != DocumentRole::Owner {
            return Err(AppError::forbidden_role(
                "Only the document owner can perform this action",
            ));
        }
        Ok(doc)
    }
}
