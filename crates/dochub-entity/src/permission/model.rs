//! Grant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dochub_core::types::{FolderId, UserId};

use super::level::GrantLevel;
use crate::folder::Folder;

/// A permission grant on a folder, unique per `(folder_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Grant {
    /// The shared folder.
    pub folder_id: FolderId,
    /// The grantee.
    pub user_id: UserId,
    /// Granted level.
    pub level: GrantLevel,
    /// The owner who issued the grant.
    pub granted_by: UserId,
    /// When the grant was first created.
    pub created_at: DateTime<Utc>,
    /// When the level last changed.
    pub updated_at: DateTime<Utc>,
}

/// A folder shared with the caller, together with the granted level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFolder {
    /// The folder.
    pub folder: Folder,
    /// The caller's grant level on it.
    pub level: GrantLevel,
}
