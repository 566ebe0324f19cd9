//! Fire-and-forget document activity recording.

pub mod recorder;

pub use recorder::{ActivityRecorder, StoreActivityRecorder};
