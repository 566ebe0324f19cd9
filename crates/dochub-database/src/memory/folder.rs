use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FolderId, UserId};
use dochub_entity::folder::{CascadePlan, CreateFolder, Folder};

use super::MemoryStore;
use crate::store::{CascadeOutcome, FolderStore};

fn sorted(mut folders: Vec<Folder>) -> Vec<Folder> {
    folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    folders
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        owner: UserId,
        parent: Option<FolderId>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        let t = self.tables.read().await;
        Ok(t.folders
            .values()
            .find(|f| f.owner_id == owner && f.parent_id == parent && f.name == name)
            .cloned())
    }

    async fn find_children(&self, parent: FolderId) -> AppResult<Vec<Folder>> {
        let t = self.tables.read().await;
        Ok(sorted(
            t.folders
                .values()
                .filter(|f| f.parent_id == Some(parent))
                .cloned()
                .collect(),
        ))
    }

    async fn find_roots(&self, owner: UserId) -> AppResult<Vec<Folder>> {
        let t = self.tables.read().await;
        Ok(sorted(
            t.folders
                .values()
                .filter(|f| f.owner_id == owner && f.parent_id.is_none())
                .cloned()
                .collect(),
        ))
    }

    async fn find_subtree(&self, root: FolderId, max_depth: usize) -> AppResult<Vec<Folder>> {
        let t = self.tables.read().await;
        let Some(root_folder) = t.folders.get(&root) else {
            return Ok(Vec::new());
        };

        let mut children: HashMap<FolderId, Vec<&Folder>> = HashMap::new();
        for folder in t.folders.values() {
            if let Some(parent) = folder.parent_id {
                children.entry(parent).or_default().push(folder);
            }
        }

        let mut out = vec![root_folder.clone()];
        let mut seen: HashSet<FolderId> = HashSet::from([root]);
        let mut queue: VecDeque<(FolderId, usize)> = VecDeque::from([(root, 0)]);
        while let Some((id, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for child in children.get(&id).into_iter().flatten() {
                if seen.insert(child.id) {
                    out.push((*child).clone());
                    queue.push_back((child.id, depth + 1));
                }
            }
        }
        Ok(out)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut t = self.tables.write().await;
        if let Some(parent) = data.parent_id {
            if !t.folders.contains_key(&parent) {
                return Err(AppError::not_found("Parent folder not found"));
            }
        }
        if t.name_taken(data.owner_id, data.parent_id, &data.name, None) {
            return Err(AppError::conflict(format!(
                "A folder named '{}' already exists here",
                data.name
            )));
        }

        let now = t.now();
        let folder = Folder {
            id: FolderId::new(),
            name: data.name.clone(),
            parent_id: data.parent_id,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        t.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        let mut t = self.tables.write().await;
        let Some(current) = t.folders.get(&id) else {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        };
        if t.name_taken(current.owner_id, current.parent_id, name, Some(id)) {
            return Err(AppError::conflict(format!(
                "A folder named '{name}' already exists here"
            )));
        }

        let now = t.now();
        let folder = t
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        folder.name = name.to_string();
        folder.updated_at = now;
        Ok(folder.clone())
    }

    async fn move_to(&self, id: FolderId, parent: Option<FolderId>) -> AppResult<Folder> {
        let mut t = self.tables.write().await;
        let Some(current) = t.folders.get(&id) else {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        };
        if let Some(parent) = parent {
            if parent == id {
                return Err(AppError::circular_reference(
                    "A folder cannot be its own parent",
                ));
            }
            if !t.folders.contains_key(&parent) {
                return Err(AppError::not_found("Parent folder not found"));
            }
        }
        if t.name_taken(current.owner_id, parent, &current.name, Some(id)) {
            return Err(AppError::conflict(format!(
                "A folder named '{}' already exists here",
                current.name
            )));
        }

        let now = t.now();
        let folder = t
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        folder.parent_id = parent;
        folder.updated_at = now;
        Ok(folder.clone())
    }

    async fn count_children(&self, id: FolderId) -> AppResult<u64> {
        let t = self.tables.read().await;
        Ok(t.folders.values().filter(|f| f.parent_id == Some(id)).count() as u64)
    }

    async fn count_documents(&self, ids: &[FolderId]) -> AppResult<HashMap<FolderId, u64>> {
        let wanted: HashSet<&FolderId> = ids.iter().collect();
        let t = self.tables.read().await;
        let mut counts = HashMap::new();
        for doc in t.documents.values() {
            if let Some(folder) = doc.folder_id.as_ref().filter(|f| wanted.contains(f)) {
                *counts.entry(*folder).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn delete_cascade(&self, plan: &CascadePlan) -> AppResult<CascadeOutcome> {
        let mut t = self.tables.write().await;

        let doomed: HashSet<FolderId> = plan.order.iter().copied().collect();
        if plan.order.iter().any(|id| !t.folders.contains_key(id)) {
            return Err(AppError::conflict(
                "Folder disappeared during delete; nothing was removed",
            ));
        }
        let orphan = t.folders.values().any(|f| {
            !doomed.contains(&f.id) && f.parent_id.is_some_and(|p| doomed.contains(&p))
        });
        if orphan {
            return Err(AppError::conflict(
                "Folder contents changed during delete; nothing was removed",
            ));
        }

        let mut outcome = CascadeOutcome::default();
        for folder_id in &plan.order {
            let doc_ids: Vec<_> = t
                .documents
                .values()
                .filter(|d| d.folder_id == Some(*folder_id))
                .map(|d| d.id)
                .collect();
            let doc_set: HashSet<_> = doc_ids.iter().copied().collect();

            t.document_labels.retain(|(doc, _)| !doc_set.contains(doc));
            t.activities.retain(|a| !doc_set.contains(&a.document_id));
            for doc_id in &doc_ids {
                if let Some(doc) = t.documents.remove(doc_id) {
                    outcome.documents_removed += 1;
                    outcome.file_paths.extend(doc.file_path);
                }
            }

            let grants_before = t.grants.len();
            t.grants.retain(|(folder, _), _| folder != folder_id);
            outcome.grants_removed += (grants_before - t.grants.len()) as u64;

            let rules_before = t.rules.len();
            t.rules.retain(|_, r| r.target_folder_id != *folder_id);
            outcome.rules_removed += (rules_before - t.rules.len()) as u64;

            t.folders.remove(folder_id);
            outcome.folders_removed += 1;
        }

        Ok(outcome)
    }
}
