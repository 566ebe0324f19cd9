//! Which documents a user may see.
//!
//! A document is visible to its owner, and to any user holding a grant on
//! the document's folder. Owning the folder alone does not expose other
//! users' documents in it; ownership of the document is irrelevant once it
//! is shared through its folder.

use serde::{Deserialize, Serialize};

use dochub_core::types::{FolderId, UserId};

use super::model::Document;
use crate::permission::GrantLevel;

/// Which slice of the visible set a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityScope {
    /// Owned plus shared.
    #[default]
    All,
    /// Only documents the user owns.
    Owned,
    /// Documents visible through a folder grant and owned by someone else.
    Shared,
}

/// Filters applied on top of the visibility predicate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    /// Visibility slice.
    pub scope: VisibilityScope,
    /// Restrict to documents directly in this folder.
    pub folder_id: Option<FolderId>,
    /// Case-insensitive substring over title and content.
    pub query: Option<String>,
}

impl DocumentFilter {
    /// Filter for a given scope with no further restriction.
    pub fn scoped(scope: VisibilityScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// The query trimmed, or `None` if blank.
    pub fn search_term(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Evaluate the filter for one document.
    ///
    /// `grant` is the user's grant on the document's folder, if any.
    pub fn matches(&self, doc: &Document, user: UserId, grant: Option<GrantLevel>) -> bool {
        let shared = doc.folder_id.is_some() && grant.is_some();
        let in_scope = match self.scope {
            VisibilityScope::All => doc.owner_id == user || shared,
            VisibilityScope::Owned => doc.owner_id == user,
            VisibilityScope::Shared => doc.owner_id != user && shared,
        };
        if !in_scope {
            return false;
        }
        if let Some(folder) = self.folder_id {
            if doc.folder_id != Some(folder) {
                return false;
            }
        }
        match self.search_term() {
            Some(term) => {
                let needle = term.to_lowercase();
                doc.title.to_lowercase().contains(&needle)
                    || doc
                        .content
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Whether `user` may see `doc`, given their grant on its folder.
pub fn is_visible(doc: &Document, user: UserId, grant: Option<GrantLevel>) -> bool {
    DocumentFilter::default().matches(doc, user, grant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dochub_core::types::DocumentId;

    fn doc(owner: UserId, folder: Option<FolderId>) -> Document {
        Document {
            id: DocumentId::new(),
            title: "Quarterly Invoice".into(),
            owner_id: owner,
            folder_id: folder,
            content: Some("Invoice #123 for March".into()),
            file_path: None,
            mime_type: None,
            size_bytes: 0,
            auto_classified: false,
            classification_keyword: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_always_sees_own_documents() {
        let owner = UserId::new();
        assert!(is_visible(&doc(owner, None), owner, None));
        assert!(is_visible(&doc(owner, Some(FolderId::new())), owner, None));
    }

    #[test]
    fn test_grant_exposes_foreign_documents() {
        let owner = UserId::new();
        let viewer = UserId::new();
        let d = doc(owner, Some(FolderId::new()));
        assert!(!is_visible(&d, viewer, None));
        assert!(is_visible(&d, viewer, Some(GrantLevel::Viewer)));
        assert!(is_visible(&d, viewer, Some(GrantLevel::Editor)));
    }

    #[test]
    fn test_unfiled_documents_are_owner_only() {
        let owner = UserId::new();
        let other = UserId::new();
        assert!(!is_visible(&doc(owner, None), other, Some(GrantLevel::Editor)));
    }

    #[test]
    fn test_shared_scope_excludes_owned() {
        let user = UserId::new();
        let folder = FolderId::new();
        let filter = DocumentFilter::scoped(VisibilityScope::Shared);
        assert!(!filter.matches(&doc(user, Some(folder)), user, Some(GrantLevel::Viewer)));
        assert!(filter.matches(&doc(UserId::new(), Some(folder)), user, Some(GrantLevel::Viewer)));
    }

    #[test]
    fn test_query_matches_title_or_content_case_insensitively() {
        let user = UserId::new();
        let d = doc(user, None);
        let mut filter = DocumentFilter::default();
        filter.query = Some("  MARCH ".into());
        assert!(filter.matches(&d, user, None));
        filter.query = Some("quarterly".into());
        assert!(filter.matches(&d, user, None));
        filter.query = Some("receipt".into());
        assert!(!filter.matches(&d, user, None));
    }
}
