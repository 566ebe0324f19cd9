//! Document activity records.

pub mod model;

pub use model::{Activity, ActivityKind};
