//! Document entity and the visibility predicate.

pub mod model;
pub mod visibility;

pub use model::{CreateDocument, Document, UpdateDocument, normalize_title};
pub use visibility::{DocumentFilter, VisibilityScope, is_visible};
