//! Activity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use dochub_core::types::{ActivityId, DocumentId, UserId};

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Document was uploaded.
    Create,
    /// Title or content changed.
    Edit,
    /// Document was deleted.
    Delete,
    /// Document was opened.
    View,
    /// Document bytes were downloaded.
    Download,
    /// Document moved between folders.
    Move,
}

impl ActivityKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::View => "view",
            Self::Download => "download",
            Self::Move => "move",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded action on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Activity {
    /// Unique activity identifier.
    pub id: ActivityId,
    /// The document acted on.
    pub document_id: DocumentId,
    /// The acting user.
    pub user_id: UserId,
    /// What happened.
    pub kind: ActivityKind,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}
