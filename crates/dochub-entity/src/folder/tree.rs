//! Arena view over a batch-loaded folder subtree.
//!
//! Services load a whole subtree in one store call, index it here by id,
//! and then traverse it without further I/O. Every traversal keeps a
//! visited set so a corrupt parent chain can never loop forever.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};

use super::model::Folder;

/// A node in a rendered folder tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Folder owner.
    pub owner_id: UserId,
    /// Distance from the tree root (0 for the root).
    pub depth: usize,
    /// Number of documents directly in this folder.
    pub document_count: u64,
    /// Child folder nodes, sorted by name.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Total number of nodes in this tree, including the root.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(FolderNode::size).sum::<usize>()
    }
}

/// Deletion order for a cascading folder delete.
///
/// `order` lists every folder of the subtree with children strictly before
/// their parents; the operation root is always the last entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadePlan {
    /// The folder the delete was requested on.
    pub root: FolderId,
    /// Bottom-up removal order.
    pub order: Vec<FolderId>,
}

impl CascadePlan {
    /// Number of folders the cascade removes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the plan removes nothing.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Folders keyed by id with a parent → children index.
#[derive(Debug, Clone, Default)]
pub struct FolderArena {
    folders: HashMap<FolderId, Folder>,
    children: HashMap<FolderId, Vec<FolderId>>,
}

impl FolderArena {
    /// Index a batch of folders. Duplicate ids keep the first occurrence.
    pub fn new(folders: impl IntoIterator<Item = Folder>) -> Self {
        let mut by_id: HashMap<FolderId, Folder> = HashMap::new();
        for folder in folders {
            by_id.entry(folder.id).or_insert(folder);
        }

        let mut children: HashMap<FolderId, Vec<FolderId>> = HashMap::new();
        for folder in by_id.values() {
            if let Some(parent) = folder.parent_id {
                children.entry(parent).or_default().push(folder.id);
            }
        }
        for ids in children.values_mut() {
            ids.sort_by(|a, b| {
                let (fa, fb) = (&by_id[a], &by_id[b]);
                fa.name.cmp(&fb.name).then(a.cmp(b))
            });
        }

        Self {
            folders: by_id,
            children,
        }
    }

    /// Look up a folder by id.
    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(&id)
    }

    /// Number of indexed folders.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the arena holds no folders.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Direct children of a folder, sorted by name.
    pub fn children_of(&self, id: FolderId) -> &[FolderId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every folder reachable from `root` in post-order: each folder appears
    /// after all of its descendants and `root` comes last.
    ///
    /// Uses an explicit stack; ids already visited are skipped, so a parent
    /// chain that loops back on itself yields each folder once.
    pub fn post_order(&self, root: FolderId) -> Vec<FolderId> {
        if !self.folders.contains_key(&root) {
            return Vec::new();
        }

        let mut order = Vec::with_capacity(self.folders.len());
        let mut visited: HashSet<FolderId> = HashSet::new();
        let mut stack: Vec<(FolderId, bool)> = vec![(root, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for child in self.children_of(id).iter().rev() {
                if !visited.contains(child) {
                    stack.push((*child, false));
                }
            }
        }

        order
    }

    /// Number of levels below `root` in the loaded subtree (0 for a leaf).
    pub fn height(&self, root: FolderId) -> usize {
        if !self.folders.contains_key(&root) {
            return 0;
        }

        let mut height = 0;
        let mut visited: HashSet<FolderId> = HashSet::from([root]);
        let mut stack: Vec<(FolderId, usize)> = vec![(root, 0)];
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            for child in self.children_of(id) {
                if visited.insert(*child) {
                    stack.push((*child, depth + 1));
                }
            }
        }
        height
    }

    /// Build the bottom-up deletion plan for the subtree under `root`.
    pub fn cascade_plan(&self, root: FolderId) -> AppResult<CascadePlan> {
        let order = self.post_order(root);
        if order.is_empty() {
            return Err(AppError::not_found(format!("Folder {root} not loaded")));
        }
        Ok(CascadePlan { root, order })
    }

    /// Render the subtree under `root` as nested nodes.
    ///
    /// `include` decides whether a folder is shown; an excluded folder hides
    /// its whole subtree. Returns `None` when the root itself is excluded.
    pub fn build_tree(
        &self,
        root: FolderId,
        document_counts: &HashMap<FolderId, u64>,
        include: &dyn Fn(&Folder) -> bool,
    ) -> Option<FolderNode> {
        let mut visited = HashSet::new();
        self.build_node(root, 0, document_counts, include, &mut visited)
    }

    fn build_node(
        &self,
        id: FolderId,
        depth: usize,
        document_counts: &HashMap<FolderId, u64>,
        include: &dyn Fn(&Folder) -> bool,
        visited: &mut HashSet<FolderId>,
    ) -> Option<FolderNode> {
        let folder = self.folders.get(&id)?;
        if !include(folder) || !visited.insert(id) {
            return None;
        }

        let children = self
            .children_of(id)
            .iter()
            .filter_map(|child| {
                self.build_node(*child, depth + 1, document_counts, include, visited)
            })
            .collect();

        Some(FolderNode {
            id,
            name: folder.name.clone(),
            owner_id: folder.owner_id,
            depth,
            document_count: document_counts.get(&id).copied().unwrap_or(0),
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn folder(name: &str, parent: Option<FolderId>, owner: UserId) -> Folder {
        Folder {
            id: FolderId::new(),
            name: name.to_string(),
            parent_id: parent,
            owner_id: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_post_order_puts_children_first() {
        let owner = UserId::new();
        let root = folder("root", None, owner);
        let a = folder("a", Some(root.id), owner);
        let b = folder("b", Some(root.id), owner);
        let a1 = folder("a1", Some(a.id), owner);
        let arena = FolderArena::new(vec![root.clone(), a.clone(), b.clone(), a1.clone()]);

        let order = arena.post_order(root.id);
        assert_eq!(order.len(), 4);
        assert_eq!(*order.last().unwrap(), root.id);
        let pos = |id| order.iter().position(|x| *x == id).unwrap();
        assert!(pos(a1.id) < pos(a.id));
        assert!(pos(a.id) < pos(root.id));
        assert!(pos(b.id) < pos(root.id));
    }

    #[test]
    fn test_post_order_terminates_on_corrupt_cycle() {
        let owner = UserId::new();
        let mut x = folder("x", None, owner);
        let y = folder("y", Some(x.id), owner);
        // Corrupt data: x claims y as its parent while y sits under x.
        x.parent_id = Some(y.id);
        let arena = FolderArena::new(vec![x.clone(), y.clone()]);

        let order = arena.post_order(x.id);
        assert_eq!(order, vec![y.id, x.id]);
    }

    #[test]
    fn test_height_counts_levels_below_root() {
        let owner = UserId::new();
        let root = folder("root", None, owner);
        let a = folder("a", Some(root.id), owner);
        let a1 = folder("a1", Some(a.id), owner);
        let b = folder("b", Some(root.id), owner);
        let arena = FolderArena::new(vec![root.clone(), a.clone(), a1.clone(), b.clone()]);

        assert_eq!(arena.height(root.id), 2);
        assert_eq!(arena.height(a.id), 1);
        assert_eq!(arena.height(b.id), 0);
        assert_eq!(arena.height(FolderId::new()), 0);
    }

    #[test]
    fn test_cascade_plan_requires_loaded_root() {
        let arena = FolderArena::new(Vec::new());
        assert!(arena.cascade_plan(FolderId::new()).is_err());
    }

    #[test]
    fn test_build_tree_prunes_excluded_subtrees() {
        let owner = UserId::new();
        let other = UserId::new();
        let root = folder("root", None, owner);
        let hidden = folder("hidden", Some(root.id), other);
        let below_hidden = folder("deep", Some(hidden.id), owner);
        let shown = folder("shown", Some(root.id), owner);
        let arena = FolderArena::new(vec![
            root.clone(),
            hidden.clone(),
            below_hidden.clone(),
            shown.clone(),
        ]);

        let mut counts = HashMap::new();
        counts.insert(shown.id, 3);
        let tree = arena
            .build_tree(root.id, &counts, &|f: &Folder| f.owner_id == owner)
            .expect("root visible");
        assert_eq!(tree.size(), 2);
        assert_eq!(tree.children[0].name, "shown");
        assert_eq!(tree.children[0].document_count, 3);
        assert_eq!(tree.children[0].depth, 1);
    }
}
