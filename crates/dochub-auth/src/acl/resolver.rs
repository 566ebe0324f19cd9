//! Resolve a user's effective level on a folder.
//!
//! Resolution order:
//! 1. Owner check: the folder owner is always `owner`, whatever grants say.
//! 2. Grant: the level of the `(folder, user)` grant row.
//! 3. Otherwise `none`.
//!
//! There is no inheritance: a folder's access never depends on its
//! parent's grants.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};
use dochub_database::store::{FolderStore, GrantStore};
use dochub_entity::folder::Folder;
use dochub_entity::permission::AccessLevel;

/// A loaded folder together with the caller's level on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderAccess {
    /// The folder.
    pub folder: Folder,
    /// The caller's effective level.
    pub level: AccessLevel,
}

/// Computes effective access from folder ownership and grants.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    folders: Arc<dyn FolderStore>,
    grants: Arc<dyn GrantStore>,
}

impl AccessResolver {
    /// Creates a new access resolver.
    pub fn new(folders: Arc<dyn FolderStore>, grants: Arc<dyn GrantStore>) -> Self {
        Self { folders, grants }
    }

    /// Level of `user` on an already-loaded folder.
    pub async fn level_on(&self, folder: &Folder, user: UserId) -> AppResult<AccessLevel> {
        if folder.owner_id == user {
            return Ok(AccessLevel::Owner);
        }
        Ok(self
            .grants
            .find(folder.id, user)
            .await?
            .map(|g| AccessLevel::from(g.level))
            .unwrap_or(AccessLevel::None))
    }

    /// Load a folder and resolve the caller's level. `None` when the
    /// folder does not exist.
    pub async fn resolve(&self, folder: FolderId, user: UserId) -> AppResult<Option<FolderAccess>> {
        let Some(folder) = self.folders.find_by_id(folder).await? else {
            return Ok(None);
        };
        let level = self.level_on(&folder, user).await?;
        Ok(Some(FolderAccess { folder, level }))
    }

    /// Effective level of `user` on `folder`.
    ///
    /// A missing folder is `not_found`, distinct from `none`.
    pub async fn effective_level(&self, folder: FolderId, user: UserId) -> AppResult<AccessLevel> {
        self.resolve(folder, user)
            .await?
            .map(|access| access.level)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder} not found")))
    }

    /// Whether `user` can read `folder`. `not_found` if it does not exist.
    pub async fn can_read(&self, folder: FolderId, user: UserId) -> AppResult<bool> {
        Ok(self.effective_level(folder, user).await?.can_read())
    }

    /// Whether `user` can write in `folder`. `not_found` if it does not exist.
    pub async fn can_write(&self, folder: FolderId, user: UserId) -> AppResult<bool> {
        Ok(self.effective_level(folder, user).await?.can_write())
    }

    /// Whether `user` administers `folder`. `not_found` if it does not exist.
    pub async fn can_administer(&self, folder: FolderId, user: UserId) -> AppResult<bool> {
        Ok(self.effective_level(folder, user).await?.can_administer())
    }

    /// Require read access. A missing folder and no access are reported
    /// identically as `not_found_or_denied`.
    pub async fn require_read(&self, folder: FolderId, user: UserId) -> AppResult<FolderAccess> {
        match self.resolve(folder, user).await? {
            Some(access) if access.level.can_read() => Ok(access),
            _ => {
                debug!(folder_id = %folder, user_id = %user, "Read denied");
                Err(AppError::not_found_or_denied(format!(
                    "Folder {folder} not found"
                )))
            }
        }
    }

    /// Require write access. A viewer gets `forbidden_role`; anyone who
    /// cannot see the folder gets `not_found_or_denied`.
    pub async fn require_write(&self, folder: FolderId, user: UserId) -> AppResult<FolderAccess> {
        let access = self.require_read(folder, user).await?;
        if !access.level.can_write() {
            return Err(AppError::forbidden_role(
                "Editor access is required for this folder",
            ));
        }
        Ok(access)
    }

    /// Require ownership. A grantee gets `forbidden_role`; anyone who
    /// cannot see the folder gets `not_found_or_denied`.
    pub async fn require_owner(&self, folder: FolderId, user: UserId) -> AppResult<FolderAccess> {
        let access = self.require_read(folder, user).await?;
        if !access.level.can_administer() {
            return Err(AppError::forbidden_role(
                "Only the folder owner can perform this action",
            ));
        }
        Ok(access)
    }

    /// Levels of `user` on a batch of loaded folders, in one grant lookup.
    pub async fn levels_on(
        &self,
        folders: &[&Folder],
        user: UserId,
    ) -> AppResult<HashMap<FolderId, AccessLevel>> {
        let foreign: Vec<FolderId> = folders
            .iter()
            .filter(|f| f.owner_id != user)
            .map(|f| f.id)
            .collect();
        let granted = self.grants.levels_for(user, &foreign).await?;

        Ok(folders
            .iter()
            .map(|f| {
                let level = if f.owner_id == user {
                    AccessLevel::Owner
                } else {
                    granted
                        .get(&f.id)
                        .map(|g| AccessLevel::from(*g))
                        .unwrap_or(AccessLevel::None)
                };
                (f.id, level)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochub_core::ErrorKind;
    use dochub_database::Stores;
    use dochub_entity::folder::CreateFolder;
    use dochub_entity::permission::GrantLevel;

    async fn setup() -> (Stores, AccessResolver, Folder, UserId) {
        let stores = Stores::memory();
        let resolver = AccessResolver::new(stores.folders.clone(), stores.grants.clone());
        let owner = UserId::new();
        let folder = stores
            .folders
            .create(&CreateFolder {
                name: "Reports".into(),
                parent_id: None,
                owner_id: owner,
            })
            .await
            .unwrap();
        (stores, resolver, folder, owner)
    }

    #[tokio::test]
    async fn test_owner_is_owner_even_with_grant_row() {
        let (stores, resolver, folder, owner) = setup().await;
        // A stray grant for the owner must not downgrade them.
        stores
            .grants
            .upsert(folder.id, owner, GrantLevel::Viewer, owner)
            .await
            .unwrap();
        assert_eq!(
            resolver.effective_level(folder.id, owner).await.unwrap(),
            AccessLevel::Owner
        );
    }

    #[tokio::test]
    async fn test_grant_levels() {
        let (stores, resolver, folder, owner) = setup().await;
        let viewer = UserId::new();
        let stranger = UserId::new();
        stores
            .grants
            .upsert(folder.id, viewer, GrantLevel::Viewer, owner)
            .await
            .unwrap();

        assert_eq!(
            resolver.effective_level(folder.id, viewer).await.unwrap(),
            AccessLevel::Viewer
        );
        assert_eq!(
            resolver.effective_level(folder.id, stranger).await.unwrap(),
            AccessLevel::None
        );
        assert!(resolver.can_read(folder.id, viewer).await.unwrap());
        assert!(!resolver.can_write(folder.id, viewer).await.unwrap());
        assert!(!resolver.can_administer(folder.id, viewer).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_folder_is_not_found_not_none() {
        let (_, resolver, _, owner) = setup().await;
        let err = resolver
            .effective_level(FolderId::new(), owner)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_guards_merge_missing_and_denied() {
        let (stores, resolver, folder, owner) = setup().await;
        let stranger = UserId::new();
        let missing = resolver.require_read(FolderId::new(), stranger).await.unwrap_err();
        let denied = resolver.require_read(folder.id, stranger).await.unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFoundOrDenied);
        assert_eq!(denied.kind, ErrorKind::NotFoundOrDenied);

        let editor = UserId::new();
        stores
            .grants
            .upsert(folder.id, editor, GrantLevel::Editor, owner)
            .await
            .unwrap();
        assert!(resolver.require_write(folder.id, editor).await.is_ok());
        let err = resolver.require_owner(folder.id, editor).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ForbiddenRole);
        assert!(resolver.require_owner(folder.id, owner).await.is_ok());
    }
}
