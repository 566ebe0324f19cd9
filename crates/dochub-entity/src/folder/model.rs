//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};

/// A folder in a user's tree.
///
/// Ownership is intrinsic: `owner_id` always holds the maximal access
/// level on the folder, independent of any grant rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name, unique among the owner's folders under the same parent.
    pub name: String,
    /// Parent folder (None for a root-level folder).
    pub parent_id: Option<FolderId>,
    /// The folder owner.
    pub owner_id: UserId,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last renamed or moved.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root-level folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `user` owns this folder.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name (already normalized).
    pub name: String,
    /// Parent folder (None for root).
    pub parent_id: Option<FolderId>,
    /// The folder owner.
    pub owner_id: UserId,
}

/// Trim a proposed folder name and check it is non-empty and at most
/// `max_len` characters.
pub fn normalize_folder_name(name: &str, max_len: usize) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "Folder name exceeds {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochub_core::ErrorKind;

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(normalize_folder_name("  Reports \n", 255).unwrap(), "Reports");
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = normalize_folder_name("   ", 255).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let name = "é".repeat(255);
        assert!(normalize_folder_name(&name, 255).is_ok());
        let err = normalize_folder_name(&"a".repeat(256), 255).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
