//! Effective access resolution and capability guards.

pub mod resolver;

pub use resolver::{AccessResolver, FolderAccess};
