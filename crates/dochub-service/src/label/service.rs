//! Label service: manage labels and link them to documents.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, LabelId};
use dochub_database::store::LabelStore;
use dochub_entity::label::{CreateLabel, Label, normalize_color};

use crate::context::RequestContext;
use crate::document::DocumentAccess;

/// Request to create a label.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLabelRequest {
    /// Label name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Display color as `#rrggbb`.
    pub color: Option<String>,
}

/// Manages the caller's labels.
#[derive(Debug, Clone)]
pub struct LabelService {
    labels: Arc<dyn LabelStore>,
    document_access: Arc<DocumentAccess>,
}

impl LabelService {
    /// Creates a new label service.
    pub fn new(labels: Arc<dyn LabelStore>, document_access: Arc<DocumentAccess>) -> Self {
        Self {
            labels,
            document_access,
        }
    }

    /// Create a label owned by the caller.
    pub async fn create_label(
        &self,
        ctx: &RequestContext,
        req: CreateLabelRequest,
    ) -> AppResult<Label> {
        req.validate()?;
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Label name cannot be empty"));
        }
        let color = req.color.as_deref().map(normalize_color).transpose()?;

        let label = self
            .labels
            .create(&CreateLabel {
                owner_id: ctx.user_id,
                name: name.to_string(),
                color,
            })
            .await?;

        info!(user_id = %ctx.user_id, label_id = %label.id, name = %label.name, "Label created");
        Ok(label)
    }

    /// The caller's labels by name.
    pub async fn list_labels(&self, ctx: &RequestContext) -> AppResult<Vec<Label>> {
        self.labels.find_by_owner(ctx.user_id).await
    }

    /// Delete one of the caller's labels and all its document links.
    pub async fn delete_label(&self, ctx: &RequestContext, label_id: LabelId) -> AppResult<()> {
        self.own_label(ctx, label_id).await?;
        self.labels.delete(label_id).await?;
        info!(user_id = %ctx.user_id, label_id = %label_id, "Label deleted");
        Ok(())
    }

    /// Attach one of the caller's labels to a document they can edit.
    /// Returns `false` if it was already attached.
    pub async fn attach(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        label_id: LabelId,
    ) -> AppResult<bool> {
        self.own_label(ctx, label_id).await?;
        self.document_access
            .require_edit(document_id, ctx.user_id)
            .await?;

        let attached = self.labels.attach(document_id, label_id).await?;
        if attached {
            info!(
                user_id = %ctx.user_id,
                document_id = %document_id,
                label_id = %label_id,
                "Label attached"
            );
        }
        Ok(attached)
    }

    /// Detach a label from a document. Returns `false` if it was not
    /// attached.
    pub async fn detach(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        label_id: LabelId,
    ) -> AppResult<bool> {
        self.own_label(ctx, label_id).await?;
        self.document_access
            .require_edit(document_id, ctx.user_id)
            .await?;
        self.labels.detach(document_id, label_id).await
    }

    /// Labels on a document the caller can see.
    pub async fn labels_for_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<Vec<Label>> {
        self.document_access
            .require_visible(document_id, ctx.user_id)
            .await?;
        self.labels.find_by_document(document_id).await
    }

    async fn own_label(&self, ctx: &RequestContext, label_id: LabelId) -> AppResult<Label> {
        self.labels
            .find_by_id(label_id)
            .await?
            .filter(|l| l.owner_id == ctx.user_id)
            .ok_or_else(|| AppError::not_found(format!("Label {label_id} not found")))
    }
}
