//! # dochub-entity
//!
//! Domain entity models for DocHub. Every struct in this crate represents a
//! database table row or a domain value object. Row types derive
//! `sqlx::FromRow`; the pure pieces of the engine that need no I/O (access
//! level predicates, the folder arena, rule ordering and matching, the
//! document visibility predicate) live here too so every store backend
//! shares them.

pub mod activity;
pub mod document;
pub mod folder;
pub mod label;
pub mod permission;
pub mod rule;
