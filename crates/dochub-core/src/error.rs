//! Unified application error types for DocHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The first seven [`ErrorKind`]
//! variants are the expected, caller-recoverable outcomes of the folder
//! and document engine; the rest signal storage or transport failures.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input had the wrong shape or length.
    Validation,
    /// The requested entity does not exist.
    NotFound,
    /// The entity does not exist, or the caller may not see it.
    ///
    /// The two cases are merged so that unauthorized callers cannot probe
    /// for the existence of folders and documents.
    NotFoundOrDenied,
    /// A duplicate name or keyword collided with an existing row.
    Conflict,
    /// A non-forced delete targeted a folder that still has contents.
    NotEmpty,
    /// A move would make a folder its own ancestor.
    CircularReference,
    /// The caller can see the entity but lacks the role for this action.
    ForbiddenRole,
    /// A database error occurred.
    Database,
    /// A storage I/O error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Return the snake-case taxonomy code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::NotFound => "not_found",
            Self::NotFoundOrDenied => "not_found_or_denied",
            Self::Conflict => "conflict",
            Self::NotEmpty => "not_empty",
            Self::CircularReference => "circular_reference",
            Self::ForbiddenRole => "forbidden_role",
            Self::Database => "database",
            Self::Storage => "storage",
            Self::Configuration => "configuration",
            Self::Serialization => "serialization",
            Self::Internal => "internal",
        }
    }

    /// Whether this kind is an expected outcome the caller can act on.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Validation
                | Self::NotFound
                | Self::NotFoundOrDenied
                | Self::Conflict
                | Self::NotEmpty
                | Self::CircularReference
                | Self::ForbiddenRole
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION_ERROR"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::NotFoundOrDenied => write!(f, "NOT_FOUND_OR_DENIED"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::NotEmpty => write!(f, "NOT_EMPTY"),
            Self::CircularReference => write!(f, "CIRCULAR_REFERENCE"),
            Self::ForbiddenRole => write!(f, "FORBIDDEN_ROLE"),
            Self::Database => write!(f, "DATABASE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout DocHub.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a merged not-found-or-denied error.
    pub fn not_found_or_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFoundOrDenied, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a not-empty error.
    pub fn not_empty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotEmpty, message)
    }

    /// Create a circular-reference error.
    pub fn circular_reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CircularReference, message)
    }

    /// Create a forbidden-role error.
    pub fn forbidden_role(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ForbiddenRole, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error is an expected, caller-recoverable outcome.
    pub fn is_expected(&self) -> bool {
        self.kind.is_expected()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(ErrorKind::Validation, format!("Invalid input: {err}"), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_kinds_are_expected() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::NotFound,
            ErrorKind::NotFoundOrDenied,
            ErrorKind::Conflict,
            ErrorKind::NotEmpty,
            ErrorKind::CircularReference,
            ErrorKind::ForbiddenRole,
        ] {
            assert!(kind.is_expected(), "{kind} should be expected");
        }
        assert!(!ErrorKind::Database.is_expected());
        assert!(!ErrorKind::Internal.is_expected());
    }

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::circular_reference("Folder cannot move under itself");
        assert_eq!(
            err.to_string(),
            "CIRCULAR_REFERENCE: Folder cannot move under itself"
        );
        assert_eq!(err.kind.code(), "circular_reference");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = AppError::from(io);
        assert!(err.source.is_some());
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Storage);
        assert!(cloned.source.is_none());
    }
}
