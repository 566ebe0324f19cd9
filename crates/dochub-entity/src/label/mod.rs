//! User-defined document labels.

pub mod model;

pub use model::{CreateLabel, Label, normalize_color};
