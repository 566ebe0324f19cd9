//! Keyword-based auto-classification of uploads.

pub mod engine;
pub mod rules;

pub use engine::{Classification, ClassificationEngine};
pub use rules::{CreateRuleRequest, RuleService, UpdateRuleRequest};
