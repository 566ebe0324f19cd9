//! # dochub-storage
//!
//! Storage for the raw bytes of uploaded documents. The document engine
//! only sees the [`StorageProvider`](dochub_core::traits::StorageProvider)
//! trait; this crate supplies the local filesystem implementation.

pub mod local;

pub use local::{LocalStorageProvider, document_path};
