//! Application result alias.

use crate::error::AppError;

/// Result alias used throughout HiveSync.
pub type AppResult<T> = Result<T, AppError>;
