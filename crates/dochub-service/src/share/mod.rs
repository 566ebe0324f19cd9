//! Folder sharing.

pub mod service;

pub use service::SharingService;
