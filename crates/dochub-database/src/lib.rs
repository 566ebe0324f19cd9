//! # dochub-database
//!
//! Store traits for every DocHub table, their PostgreSQL implementations,
//! an in-memory implementation with the same guarantees, and connection
//! and migration management.
//!
//! Services never name a backend: they receive a [`Stores`] bundle of
//! trait objects built by [`Stores::postgres`] or [`Stores::memory`].

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;
pub mod stores;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    ActivityStore, CascadeOutcome, DocumentStore, FolderStore, GrantStore, LabelStore, RuleStore,
};
pub use stores::Stores;
