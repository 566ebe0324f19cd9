//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{DocumentId, FolderId, UserId};

/// Longest accepted document title, in characters.
pub const MAX_TITLE_LENGTH: usize = 500;

/// A document stored in DocHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Display title.
    pub title: String,
    /// The document owner. Never changes after creation.
    pub owner_id: UserId,
    /// Containing folder (None for an unfiled, owner-only document).
    pub folder_id: Option<FolderId>,
    /// Extracted text content.
    pub content: Option<String>,
    /// Path of the uploaded bytes within the storage provider.
    pub file_path: Option<String>,
    /// MIME type of the upload.
    pub mime_type: Option<String>,
    /// Size of the upload in bytes.
    pub size_bytes: i64,
    /// Whether the folder was chosen by a classification rule.
    pub auto_classified: bool,
    /// The keyword of the rule that routed the document, if any.
    pub classification_keyword: Option<String>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last edited or moved.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether `user` owns this document.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Whether the document sits outside any folder.
    pub fn is_unfiled(&self) -> bool {
        self.folder_id.is_none()
    }
}

/// Data required to create a new document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Pre-allocated id, so the upload path can be derived before insert.
    pub id: DocumentId,
    /// Display title (already normalized).
    pub title: String,
    /// The document owner.
    pub owner_id: UserId,
    /// Resolved folder.
    pub folder_id: Option<FolderId>,
    /// Extracted text.
    pub content: Option<String>,
    /// Storage path of the uploaded bytes.
    pub file_path: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Whether a rule chose the folder.
    pub auto_classified: bool,
    /// Keyword of the routing rule.
    pub classification_keyword: Option<String>,
}

/// Editable document fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocument {
    /// New title.
    pub title: Option<String>,
    /// New text content.
    pub content: Option<String>,
}

impl UpdateDocument {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Trim a document title and check it is non-empty and not too long.
pub fn normalize_title(title: &str) -> AppResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Document title cannot be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::validation(format!(
            "Document title exceeds {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title(" invoice.pdf ").unwrap(), "invoice.pdf");
        assert!(normalize_title("").is_err());
        assert!(normalize_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_empty_update() {
        assert!(UpdateDocument::default().is_empty());
        let update = UpdateDocument {
            title: Some("New".into()),
            content: None,
        };
        assert!(!update.is_empty());
    }
}
