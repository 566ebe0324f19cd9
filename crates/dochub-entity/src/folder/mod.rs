//! Folder domain entities.

pub mod model;
pub mod tree;

pub use model::{CreateFolder, Folder, normalize_folder_name};
pub use tree::{CascadePlan, FolderArena, FolderNode};
