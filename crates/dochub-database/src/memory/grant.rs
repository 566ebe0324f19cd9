use std::collections::HashMap;

use async_trait::async_trait;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};
use dochub_entity::permission::{Grant, GrantLevel, SharedFolder};

use super::MemoryStore;
use crate::store::GrantStore;

#[async_trait]
impl GrantStore for MemoryStore {
    async fn find(&self, folder: FolderId, user: UserId) -> AppResult<Option<Grant>> {
        Ok(self.tables.read().await.grants.get(&(folder, user)).cloned())
    }

    async fn find_by_folder(&self, folder: FolderId) -> AppResult<Vec<Grant>> {
        let t = self.tables.read().await;
        let mut grants: Vec<Grant> = t
            .grants
            .values()
            .filter(|g| g.folder_id == folder)
            .cloned()
            .collect();
        grants.sort_by_key(|g| g.created_at);
        Ok(grants)
    }

    async fn levels_for(
        &self,
        user: UserId,
        folders: &[FolderId],
    ) -> AppResult<HashMap<FolderId, GrantLevel>> {
        let t = self.tables.read().await;
        Ok(folders
            .iter()
            .filter_map(|f| t.grants.get(&(*f, user)).map(|g| (*f, g.level)))
            .collect())
    }

    async fn upsert(
        &self,
        folder: FolderId,
        user: UserId,
        level: GrantLevel,
        granted_by: UserId,
    ) -> AppResult<Grant> {
        let mut t = self.tables.write().await;
        if !t.folders.contains_key(&folder) {
            return Err(AppError::not_found(format!("Folder {folder} not found")));
        }

        let now = t.now();
        let grant = t
            .grants
            .entry((folder, user))
            .and_modify(|g| {
                g.level = level;
                g.granted_by = granted_by;
                g.updated_at = now;
            })
            .or_insert_with(|| Grant {
                folder_id: folder,
                user_id: user,
                level,
                granted_by,
                created_at: now,
                updated_at: now,
            });
        Ok(grant.clone())
    }

    async fn update_level(
        &self,
        folder: FolderId,
        user: UserId,
        level: GrantLevel,
    ) -> AppResult<Option<Grant>> {
        let mut t = self.tables.write().await;
        let now = t.now();
        Ok(t.grants.get_mut(&(folder, user)).map(|g| {
            g.level = level;
            g.updated_at = now;
            g.clone()
        }))
    }

    async fn delete(&self, folder: FolderId, user: UserId) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .grants
            .remove(&(folder, user))
            .is_some())
    }

    async fn find_shared_with(&self, user: UserId) -> AppResult<Vec<SharedFolder>> {
        let t = self.tables.read().await;
        let mut shared: Vec<SharedFolder> = t
            .grants
            .values()
            .filter(|g| g.user_id == user)
            .filter_map(|g| {
                t.folders
                    .get(&g.folder_id)
                    .filter(|f| f.owner_id != user)
                    .map(|f| SharedFolder {
                        folder: f.clone(),
                        level: g.level,
                    })
            })
            .collect();
        shared.sort_by(|a, b| {
            a.folder
                .name
                .cmp(&b.folder.name)
                .then(a.folder.id.cmp(&b.folder.id))
        });
        Ok(shared)
    }
}
