//! Folder tree operations: create, rename, move, delete, copy and views.

pub mod service;
pub mod tree;

pub use service::{CopyFolderRequest, CreateFolderRequest, DeleteFolderOutcome, FolderService};
pub use tree::{Breadcrumb, TreeService};
