//! Classification rules and keyword matching.

pub mod matcher;
pub mod model;

pub use matcher::{match_rules, order_for_matching};
pub use model::{ClassificationRule, CreateRule, UpdateRule, normalize_keyword};
