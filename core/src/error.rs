//! Common error types for the core model.

use thiserror::Error;

/// Errors raised by the core model.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A property path string could not be parsed.
    #[error("Invalid property path '{path}': {reason}")]
    InvalidPropertyPath { path: String, reason: String },
}

impl CoreError {
    pub fn invalid_property_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPropertyPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
