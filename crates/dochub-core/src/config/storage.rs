//! Uploaded file storage configuration.

use serde::{Deserialize, Serialize};

/// Local filesystem storage for uploaded document bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which document files are written.
    #[serde(default = "default_root_path")]
    pub root_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
        }
    }
}

fn default_root_path() -> String {
    "./data/uploads".to_string()
}
