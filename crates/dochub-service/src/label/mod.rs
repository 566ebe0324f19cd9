//! Per-user document labels.

pub mod service;

pub use service::{CreateLabelRequest, LabelService};
