//! Folder creation, rename, move, cascading delete and copy.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dochub_auth::AccessResolver;
use dochub_core::AppError;
use dochub_core::config::TreeConfig;
use dochub_core::result::AppResult;
use dochub_core::traits::StorageProvider;
use dochub_core::types::{FolderId, UserId};
use dochub_database::store::{CascadeOutcome, FolderStore};
use dochub_entity::folder::{CreateFolder, Folder, FolderArena, normalize_folder_name};

use crate::cleanup::remove_files;
use crate::context::RequestContext;

/// Suffix appended to the name of a copied folder.
const COPY_SUFFIX: &str = " (copy)";
/// Numbered copy names tried before giving up with a conflict.
const MAX_COPY_ATTEMPTS: usize = 100;

/// Request to create a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name (trimmed before use).
    pub name: String,
    /// Parent folder (None for root-level).
    pub parent_id: Option<FolderId>,
}

/// Request to copy a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopyFolderRequest {
    /// Where to place the copy. Defaults to the source's parent when the
    /// copier can read it, otherwise the copier's root.
    pub destination_parent: Option<FolderId>,
    /// Name of the copy. Defaults to `"<name> (copy)"`.
    pub name: Option<String>,
}

/// Result of a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFolderOutcome {
    /// Rows removed.
    pub removed: CascadeOutcome,
    /// Stored files that could not be removed.
    pub files_failed: usize,
}

/// Manages folder tree mutations.
#[derive(Debug, Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    access: Arc<AccessResolver>,
    storage: Arc<dyn StorageProvider>,
    limits: TreeConfig,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        access: Arc<AccessResolver>,
        storage: Arc<dyn StorageProvider>,
        limits: TreeConfig,
    ) -> Self {
        Self {
            folders,
            access,
            storage,
            limits,
        }
    }

    /// Gets a folder the caller can read.
    pub async fn get_folder(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        Ok(self.access.require_read(folder_id, ctx.user_id).await?.folder)
    }

    /// Lists the caller's root-level folders.
    pub async fn list_root_folders(&self, ctx: &RequestContext) -> AppResult<Vec<Folder>> {
        self.folders.find_roots(ctx.user_id).await
    }

    /// Lists the direct children of a readable folder that the caller can
    /// also read.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> AppResult<Vec<Folder>> {
        self.access.require_read(folder_id, ctx.user_id).await?;

        let children = self.folders.find_children(folder_id).await?;
        let refs: Vec<&Folder> = children.iter().collect();
        let levels = self.access.levels_on(&refs, ctx.user_id).await?;

        Ok(children
            .into_iter()
            .filter(|f| levels.get(&f.id).is_some_and(|l| l.can_read()))
            .collect())
    }

    /// Creates a folder owned by the caller.
    ///
    /// Any read access on the parent is enough; the creator owns the new
    /// folder regardless of who owns the parent.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        let name = normalize_folder_name(&req.name, self.limits.name_limit())?;

        if let Some(parent_id) = req.parent_id {
            self.access.require_read(parent_id, ctx.user_id).await?;
            let depth = self.depth_of(parent_id, None).await? + 1;
            self.ensure_within_depth(depth)?;
        }

        self.ensure_name_free(ctx.user_id, req.parent_id, &name, None)
            .await?;

        let folder = self
            .folders
            .create(&CreateFolder {
                name,
                parent_id: req.parent_id,
                owner_id: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            name = %folder.name,
            "Folder created"
        );

        Ok(folder)
    }

    /// Renames a folder. Owner only.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_name: &str,
    ) -> AppResult<Folder> {
        let folder = self.access.require_owner(folder_id, ctx.user_id).await?.folder;
        let name = normalize_folder_name(new_name, self.limits.name_limit())?;
        if name == folder.name {
            return Ok(folder);
        }

        self.ensure_name_free(folder.owner_id, folder.parent_id, &name, Some(folder.id))
            .await?;
        let renamed = self.folders.rename(folder_id, &name).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            old_name = %folder.name,
            new_name = %renamed.name,
            "Folder renamed"
        );

        Ok(renamed)
    }

    /// Moves a folder under `new_parent` (None for root-level). Owner only.
    ///
    /// Fails with `circular_reference` if `new_parent` is the folder itself
    /// or one of its descendants, and with `validation_error` if the moved
    /// subtree would end up nested deeper than `max_depth`.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_parent: Option<FolderId>,
    ) -> AppResult<Folder> {
        let folder = self.access.require_owner(folder_id, ctx.user_id).await?.folder;

        if let Some(dest) = new_parent {
            if dest == folder_id {
                return Err(AppError::circular_reference(
                    "A folder cannot be moved into itself",
                ));
            }
            self.access.require_read(dest, ctx.user_id).await?;
            let dest_depth = self.depth_of(dest, Some(folder_id)).await?;

            let subtree = self
                .folders
                .find_subtree(folder_id, self.limits.max_depth)
                .await?;
            let height = FolderArena::new(subtree).height(folder_id);
            self.ensure_within_depth(dest_depth + 1 + height)?;
        }

        if folder.parent_id == new_parent {
            return Ok(folder);
        }

        self.ensure_name_free(folder.owner_id, new_parent, &folder.name, Some(folder.id))
            .await?;
        let moved = self.folders.move_to(folder_id, new_parent).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            from = ?folder.parent_id,
            to = ?new_parent,
            "Folder moved"
        );

        Ok(moved)
    }

    /// Deletes a folder. Owner only.
    ///
    /// Without `force` the folder must have no subfolders and no documents.
    /// With `force` the whole subtree is removed in one atomic store call;
    /// stored files are removed afterwards on a best-effort basis.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        force: bool,
    ) -> AppResult<DeleteFolderOutcome> {
        self.access.require_owner(folder_id, ctx.user_id).await?;

        if !force {
            let children = self.folders.count_children(folder_id).await?;
            let documents = self
                .folders
                .count_documents(&[folder_id])
                .await?
                .get(&folder_id)
                .copied()
                .unwrap_or(0);
            if children > 0 || documents > 0 {
                return Err(AppError::not_empty(format!(
                    "Folder contains {children} subfolder(s) and {documents} document(s)"
                )));
            }
        }

        let subtree = self
            .folders
            .find_subtree(folder_id, self.limits.max_depth)
            .await?;
        let plan = FolderArena::new(subtree).cascade_plan(folder_id)?;
        let removed = self.folders.delete_cascade(&plan).await?;

        let files_failed = remove_files(self.storage.as_ref(), &removed.file_paths).await;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            force,
            folders = removed.folders_removed,
            documents = removed.documents_removed,
            grants = removed.grants_removed,
            rules = removed.rules_removed,
            files_failed,
            "Folder deleted"
        );

        Ok(DeleteFolderOutcome {
            removed,
            files_failed,
        })
    }

    /// Copies a folder the caller can read into a new, empty folder owned
    /// by the caller. Grants, subfolders and documents are not copied.
    pub async fn copy_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        req: CopyFolderRequest,
    ) -> AppResult<Folder> {
        let source = self.access.require_read(folder_id, ctx.user_id).await?.folder;

        let parent_id = match req.destination_parent {
            Some(dest) => {
                self.access.require_read(dest, ctx.user_id).await?;
                Some(dest)
            }
            None => match source.parent_id {
                Some(parent) if self.access.can_read(parent, ctx.user_id).await? => Some(parent),
                _ => None,
            },
        };
        if let Some(parent) = parent_id {
            let depth = self.depth_of(parent, None).await? + 1;
            self.ensure_within_depth(depth)?;
        }

        let name = match req.name {
            Some(name) => {
                let name = normalize_folder_name(&name, self.limits.name_limit())?;
                self.ensure_name_free(ctx.user_id, parent_id, &name, None)
                    .await?;
                name
            }
            None => self.free_copy_name(ctx.user_id, parent_id, &source.name).await?,
        };

        let copy = self
            .folders
            .create(&CreateFolder {
                name,
                parent_id,
                owner_id: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            source_id = %folder_id,
            folder_id = %copy.id,
            parent_id = ?copy.parent_id,
            "Folder copied"
        );

        Ok(copy)
    }

    async fn ensure_name_free(
        &self,
        owner: UserId,
        parent: Option<FolderId>,
        name: &str,
        except: Option<FolderId>,
    ) -> AppResult<()> {
        match self.folders.find_by_name(owner, parent, name).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::conflict(format!(
                "A folder named '{name}' already exists here"
            ))),
            _ => Ok(()),
        }
    }

    /// Number of ancestors of `start`.
    ///
    /// Fails with `circular_reference` if the walk meets `moving` or loops
    /// back on itself. The walk never follows more than `max_depth` hops.
    async fn depth_of(&self, start: FolderId, moving: Option<FolderId>) -> AppResult<usize> {
        let mut visited: HashSet<FolderId> = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if Some(id) == moving {
                return Err(AppError::circular_reference(
                    "A folder cannot be moved into one of its own subfolders",
                ));
            }
            if !visited.insert(id) {
                warn!(folder_id = %id, "Parent chain loops back on itself");
                return Err(AppError::circular_reference(
                    "Destination folder has a corrupt parent chain",
                ));
            }
            if visited.len() > self.limits.max_depth + 1 {
                return Err(self.too_deep());
            }
            current = self
                .folders
                .find_by_id(id)
                .await?
                .and_then(|f| f.parent_id);
        }
        Ok(visited.len().saturating_sub(1))
    }

    /// Subtree loads stop at `max_depth`, so no folder may sit deeper.
    fn ensure_within_depth(&self, depth: usize) -> AppResult<()> {
        if depth > self.limits.max_depth {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn too_deep(&self) -> AppError {
        AppError::validation(format!(
            "Folders cannot be nested more than {} levels deep",
            self.limits.max_depth
        ))
    }

    async fn free_copy_name(
        &self,
        owner: UserId,
        parent: Option<FolderId>,
        base: &str,
    ) -> AppResult<String> {
        for attempt in 1..=MAX_COPY_ATTEMPTS {
            let suffix = if attempt == 1 {
                COPY_SUFFIX.to_string()
            } else {
                format!(" (copy {attempt})")
            };
            let name = copy_name(base, &suffix, self.limits.name_limit());
            if self.folders.find_by_name(owner, parent, &name).await?.is_none() {
                return Ok(name);
            }
        }
        Err(AppError::conflict(format!(
            "Too many copies of '{base}' already exist here"
        )))
    }
}

/// `base` + `suffix`, shortening `base` so the result fits in `max_len`
/// characters.
fn copy_name(base: &str, suffix: &str, max_len: usize) -> String {
    let room = max_len.saturating_sub(suffix.chars().count());
    let trimmed: String = base.chars().take(room).collect();
    format!("{}{suffix}", trimmed.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_name_fits_limit() {
        assert_eq!(copy_name("Reports", COPY_SUFFIX, 255), "Reports (copy)");
        let long = "x".repeat(255);
        let name = copy_name(&long, COPY_SUFFIX, 255);
        assert_eq!(name.chars().count(), 255);
        assert!(name.ends_with(" (copy)"));
    }
}
