//! Sharing service: grant, update, revoke and list folder grants.

use std::sync::Arc;

use tracing::info;

use dochub_auth::AccessResolver;
use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};
use dochub_database::store::GrantStore;
use dochub_entity::permission::{Grant, GrantLevel, SharedFolder};

use crate::context::RequestContext;

/// Manages per-folder grants. Every mutation is owner only.
#[derive(Debug, Clone)]
pub struct SharingService {
    grants: Arc<dyn GrantStore>,
    access: Arc<AccessResolver>,
}

impl SharingService {
    /// Creates a new sharing service.
    pub fn new(grants: Arc<dyn GrantStore>, access: Arc<AccessResolver>) -> Self {
        Self { grants, access }
    }

    /// Share a folder with `grantee`, or change the level of an existing
    /// grant for the same pair.
    pub async fn share_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        grantee: UserId,
        level: GrantLevel,
    ) -> AppResult<Grant> {
        self.access.require_owner(folder_id, ctx.user_id).await?;

        if grantee == ctx.user_id {
            return Err(AppError::validation("Cannot share a folder with yourself"));
        }

        let grant = self
            .grants
            .upsert(folder_id, grantee, level, ctx.user_id)
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            grantee = %grantee,
            level = %level,
            "Folder shared"
        );

        Ok(grant)
    }

    /// Change the level of an existing grant.
    pub async fn update_level(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        grantee: UserId,
        level: GrantLevel,
    ) -> AppResult<Grant> {
        self.access.require_owner(folder_id, ctx.user_id).await?;

        let grant = self
            .grants
            .update_level(folder_id, grantee, level)
            .await?
            .ok_or_else(|| AppError::not_found("No grant exists for this user"))?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            grantee = %grantee,
            level = %level,
            "Grant level updated"
        );

        Ok(grant)
    }

    /// Remove a grant.
    pub async fn revoke(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        grantee: UserId,
    ) -> AppResult<()> {
        self.access.require_owner(folder_id, ctx.user_id).await?;

        if !self.grants.delete(folder_id, grantee).await? {
            return Err(AppError::not_found("No grant exists for this user"));
        }

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            grantee = %grantee,
            "Grant revoked"
        );

        Ok(())
    }

    /// All grants on a folder. Owner only.
    pub async fn list_grants(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> AppResult<Vec<Grant>> {
        self.access.require_owner(folder_id, ctx.user_id).await?;
        self.grants.find_by_folder(folder_id).await
    }

    /// Folders other users have shared with the caller.
    pub async fn list_shared_with_me(&self, ctx: &RequestContext) -> AppResult<Vec<SharedFolder>> {
        self.grants.find_shared_with(ctx.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochub_core::ErrorKind;
    use dochub_database::Stores;
    use dochub_entity::folder::CreateFolder;

    async fn setup() -> (SharingService, FolderId, RequestContext) {
        let stores = Stores::memory();
        let access = Arc::new(AccessResolver::new(
            stores.folders.clone(),
            stores.grants.clone(),
        ));
        let owner = RequestContext::new(UserId::new());
        let folder = stores
            .folders
            .create(&CreateFolder {
                name: "Reports".into(),
                parent_id: None,
                owner_id: owner.user_id,
            })
            .await
            .unwrap();
        (SharingService::new(stores.grants, access), folder.id, owner)
    }

    #[tokio::test]
    async fn test_share_upserts_in_place() {
        let (sharing, folder, owner) = setup().await;
        let bob = UserId::new();

        sharing
            .share_folder(&owner, folder, bob, GrantLevel::Viewer)
            .await
            .unwrap();
        let grant = sharing
            .share_folder(&owner, folder, bob, GrantLevel::Editor)
            .await
            .unwrap();
        assert_eq!(grant.level, GrantLevel::Editor);
        assert_eq!(sharing.list_grants(&owner, folder).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cannot_share_with_self() {
        let (sharing, folder, owner) = setup().await;
        let err = sharing
            .share_folder(&owner, folder, owner.user_id, GrantLevel::Viewer)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_update_and_revoke_require_existing_grant() {
        let (sharing, folder, owner) = setup().await;
        let bob = UserId::new();

        let err = sharing
            .update_level(&owner, folder, bob, GrantLevel::Editor)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = sharing.revoke(&owner, folder, bob).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_grantee_cannot_reshare() {
        let (sharing, folder, owner) = setup().await;
        let bob = RequestContext::new(UserId::new());
        sharing
            .share_folder(&owner, folder, bob.user_id, GrantLevel::Editor)
            .await
            .unwrap();

        let err = sharing
            .share_folder(&bob, folder, UserId::new(), GrantLevel::Viewer)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ForbiddenRole);

        let shared = sharing.list_shared_with_me(&bob).await.unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].folder.id, folder);
    }
}
