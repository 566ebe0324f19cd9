//! Folder tree limits.

use serde::{Deserialize, Serialize};

/// Bounds applied to folder names and tree traversals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum number of parent hops followed by any ancestor walk or
    /// subtree load. Walks stop here even on corrupt data.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum folder name length in characters. Values above
    /// [`FOLDER_NAME_COLUMN_WIDTH`] are clamped to it.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

/// Width of the `folders.name` column.
pub const FOLDER_NAME_COLUMN_WIDTH: usize = 255;

impl TreeConfig {
    /// Name length limit actually enforced.
    pub fn name_limit(&self) -> usize {
        self.max_name_length.min(FOLDER_NAME_COLUMN_WIDTH)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_name_length: default_max_name_length(),
        }
    }
}

fn default_max_depth() -> usize {
    256
}

fn default_max_name_length() -> usize {
    255
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_limit_never_exceeds_column_width() {
        let mut config = TreeConfig::default();
        assert_eq!(config.name_limit(), 255);

        config.max_name_length = 1000;
        assert_eq!(config.name_limit(), FOLDER_NAME_COLUMN_WIDTH);

        config.max_name_length = 64;
        assert_eq!(config.name_limit(), 64);
    }
}
