//! Classification rule limits.

use serde::{Deserialize, Serialize};

/// Limits applied when users create classification rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Maximum keyword length in characters.
    #[serde(default = "default_max_keyword_length")]
    pub max_keyword_length: usize,
    /// Maximum number of rules a single user may own.
    #[serde(default = "default_max_rules_per_user")]
    pub max_rules_per_user: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            max_keyword_length: default_max_keyword_length(),
            max_rules_per_user: default_max_rules_per_user(),
        }
    }
}

fn default_max_keyword_length() -> usize {
    100
}

fn default_max_rules_per_user() -> usize {
    200
}
