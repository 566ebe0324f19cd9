//! Grant levels and effective access levels.
//!
//! A stored grant can only ever be `viewer` or `editor`. `owner` is not a
//! grant value: it is derived from `Folder::owner_id`, so no row can
//! confer it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Level stored on a grant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "grant_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GrantLevel {
    /// Read-only access to the folder and its documents.
    Viewer,
    /// Read and write access to the folder's documents.
    Editor,
}

impl GrantLevel {
    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
        }
    }
}

impl fmt::Display for GrantLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GrantLevel {
    type Err = dochub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "editor" => Ok(Self::Editor),
            _ => Err(dochub_core::AppError::validation(format!(
                "Invalid permission level: '{s}' (expected viewer or editor)"
            ))),
        }
    }
}

/// Effective access a user holds on a folder.
///
/// Ordered by privilege: `None < Viewer < Editor < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// No access.
    None,
    /// Granted viewer.
    Viewer,
    /// Granted editor.
    Editor,
    /// Folder owner.
    Owner,
}

impl AccessLevel {
    /// Viewer, editor or owner.
    pub fn can_read(&self) -> bool {
        *self >= Self::Viewer
    }

    /// Editor or owner.
    pub fn can_write(&self) -> bool {
        *self >= Self::Editor
    }

    /// Owner only: share, rename, move, delete.
    pub fn can_administer(&self) -> bool {
        *self == Self::Owner
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Owner => "owner",
        }
    }
}

impl From<GrantLevel> for AccessLevel {
    fn from(level: GrantLevel) -> Self {
        match level {
            GrantLevel::Viewer => Self::Viewer,
            GrantLevel::Editor => Self::Editor,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(!AccessLevel::None.can_read());
        assert!(AccessLevel::Viewer.can_read());
        assert!(!AccessLevel::Viewer.can_write());
        assert!(AccessLevel::Editor.can_write());
        assert!(!AccessLevel::Editor.can_administer());
        assert!(AccessLevel::Owner.can_administer());
    }

    #[test]
    fn test_grant_never_reaches_owner() {
        for grant in [GrantLevel::Viewer, GrantLevel::Editor] {
            assert!(AccessLevel::from(grant) < AccessLevel::Owner);
        }
    }

    #[test]
    fn test_parse_rejects_owner() {
        assert_eq!("Editor".parse::<GrantLevel>().unwrap(), GrantLevel::Editor);
        assert!("owner".parse::<GrantLevel>().is_err());
    }
}
