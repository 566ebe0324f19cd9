//! Listing the documents a user can see.

use std::sync::Arc;

use dochub_core::result::AppResult;
use dochub_core::types::{PageRequest, PageResponse};
use dochub_database::store::DocumentStore;
use dochub_entity::document::{Document, DocumentFilter, VisibilityScope};

use crate::context::RequestContext;

/// Paged, deduplicated listings over the visibility rule.
#[derive(Debug, Clone)]
pub struct VisibilityIndex {
    documents: Arc<dyn DocumentStore>,
}

impl VisibilityIndex {
    /// Creates a new visibility index.
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Documents the caller owns or can read through a folder grant, most
    /// recently updated first.
    pub async fn visible_documents(
        &self,
        ctx: &RequestContext,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        self.documents.list_visible(ctx.user_id, filter, page).await
    }

    /// Documents the caller owns.
    pub async fn my_documents(
        &self,
        ctx: &RequestContext,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let filter = DocumentFilter {
            scope: VisibilityScope::Owned,
            ..filter.clone()
        };
        self.documents.list_visible(ctx.user_id, &filter, page).await
    }

    /// Documents owned by others that the caller sees through a grant.
    pub async fn shared_documents(
        &self,
        ctx: &RequestContext,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let filter = DocumentFilter {
            scope: VisibilityScope::Shared,
            ..filter.clone()
        };
        self.documents.list_visible(ctx.user_id, &filter, page).await
    }
}
