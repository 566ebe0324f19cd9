//! Folder permission grants and effective access levels.

pub mod level;
pub mod model;

pub use level::{AccessLevel, GrantLevel};
pub use model::{Grant, SharedFolder};
