//! Document ingestion, lifecycle and visibility views.

pub mod access;
pub mod service;
pub mod visibility;

pub use access::{DocumentAccess, DocumentRole};
pub use service::{DocumentService, IngestOutcome, IngestRequest, UpdateDocumentRequest};
pub use visibility::VisibilityIndex;
