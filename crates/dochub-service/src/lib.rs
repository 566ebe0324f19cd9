//! # dochub-service
//!
//! Business logic service layer for DocHub. Each service orchestrates the
//! stores, the access resolver and the storage provider to implement one
//! group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. [`Services`] wires the whole
//! graph from a [`Stores`](dochub_database::Stores) bundle.

pub mod activity;
pub mod classification;
pub mod cleanup;
pub mod context;
pub mod document;
pub mod folder;
pub mod label;
pub mod services;
pub mod share;

pub use activity::{ActivityRecorder, StoreActivityRecorder};
pub use classification::{
    Classification, ClassificationEngine, CreateRuleRequest, RuleService, UpdateRuleRequest,
};
pub use context::RequestContext;
pub use document::{
    DocumentAccess, DocumentRole, DocumentService, IngestOutcome, IngestRequest,
    UpdateDocumentRequest, VisibilityIndex,
};
pub use folder::{
    Breadcrumb, CopyFolderRequest, CreateFolderRequest, DeleteFolderOutcome, FolderService,
    TreeService,
};
pub use label::{CreateLabelRequest, LabelService};
pub use services::Services;
pub use share::SharingService;
