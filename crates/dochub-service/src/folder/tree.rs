//! Read-side views over the folder tree.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dochub_auth::AccessResolver;
use dochub_core::config::TreeConfig;
use dochub_core::result::AppResult;
use dochub_core::types::FolderId;
use dochub_database::store::FolderStore;
use dochub_entity::folder::{Folder, FolderArena, FolderNode};

use crate::context::RequestContext;

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
}

/// Renders folder subtrees and ancestor trails.
#[derive(Debug, Clone)]
pub struct TreeService {
    folders: Arc<dyn FolderStore>,
    access: Arc<AccessResolver>,
    limits: TreeConfig,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        access: Arc<AccessResolver>,
        limits: TreeConfig,
    ) -> Self {
        Self {
            folders,
            access,
            limits,
        }
    }

    /// The subtree under a readable folder.
    ///
    /// Subfolders the caller cannot read are pruned together with
    /// everything below them, since access is not inherited.
    pub async fn get_tree(&self, ctx: &RequestContext, root: FolderId) -> AppResult<FolderNode> {
        let access = self.access.require_read(root, ctx.user_id).await?;

        let subtree = self.folders.find_subtree(root, self.limits.max_depth).await?;
        let refs: Vec<&Folder> = subtree.iter().collect();
        let levels = self.access.levels_on(&refs, ctx.user_id).await?;
        let ids: Vec<FolderId> = subtree.iter().map(|f| f.id).collect();
        let counts = self.folders.count_documents(&ids).await?;

        let arena = FolderArena::new(subtree);
        let include = |f: &Folder| f.id == root || levels.get(&f.id).is_some_and(|l| l.can_read());

        let tree = arena.build_tree(root, &counts, &include).unwrap_or_else(|| FolderNode {
            id: access.folder.id,
            name: access.folder.name.clone(),
            owner_id: access.folder.owner_id,
            depth: 0,
            document_count: counts.get(&root).copied().unwrap_or(0),
            children: Vec::new(),
        });

        debug!(user_id = %ctx.user_id, folder_id = %root, nodes = tree.size(), "Tree rendered");
        Ok(tree)
    }

    /// Ancestor trail from the outermost readable ancestor down to `folder`.
    ///
    /// The walk stops at the first ancestor the caller cannot read, at a
    /// revisited id, or after `max_depth` hops.
    pub async fn breadcrumbs(
        &self,
        ctx: &RequestContext,
        folder: FolderId,
    ) -> AppResult<Vec<Breadcrumb>> {
        let start = self.access.require_read(folder, ctx.user_id).await?.folder;

        let mut trail = vec![Breadcrumb {
            id: start.id,
            name: start.name,
        }];
        let mut visited: HashSet<FolderId> = HashSet::from([start.id]);
        let mut next = start.parent_id;

        while let Some(id) = next {
            if trail.len() > self.limits.max_depth {
                warn!(folder_id = %folder, "Breadcrumb walk hit the depth limit");
                break;
            }
            if !visited.insert(id) {
                warn!(folder_id = %id, "Parent chain loops back on itself");
                break;
            }
            let Some(access) = self.access.resolve(id, ctx.user_id).await? else {
                break;
            };
            if !access.level.can_read() {
                break;
            }
            next = access.folder.parent_id;
            trail.push(Breadcrumb {
                id: access.folder.id,
                name: access.folder.name,
            });
        }

        trail.reverse();
        Ok(trail)
    }
}
