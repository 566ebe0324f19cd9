//! Label entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dochub_core::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{LabelId, UserId};

/// A label a user can attach to documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Label {
    /// Unique label identifier.
    pub id: LabelId,
    /// The label owner.
    pub owner_id: UserId,
    /// Label name, unique per owner.
    pub name: String,
    /// Display color as `#rrggbb`.
    pub color: Option<String>,
    /// When the label was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLabel {
    /// The label owner.
    pub owner_id: UserId,
    /// Label name.
    pub name: String,
    /// Display color.
    pub color: Option<String>,
}

/// Lower-case a `#rrggbb` color, rejecting anything else.
pub fn normalize_color(color: &str) -> AppResult<String> {
    let color = color.trim();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(AppError::validation(format!(
            "Invalid label color '{color}' (expected #rrggbb)"
        )));
    }
    Ok(color.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color() {
        assert_eq!(normalize_color("#FFaa00").unwrap(), "#ffaa00");
        assert!(normalize_color("ffaa00").is_err());
        assert!(normalize_color("#ggg000").is_err());
    }
}
