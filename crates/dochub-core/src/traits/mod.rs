//! Core traits defined in `dochub-core` and implemented by other crates.

pub mod storage;

pub use storage::StorageProvider;
