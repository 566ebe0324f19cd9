//! Convenience result type alias for DocHub.

use crate::error::AppError;

/// A specialized `Result` type for DocHub operations.
pub type AppResult<T> = Result<T, AppError>;
