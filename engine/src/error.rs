//! Validation engine errors.
//!
//! Violations are not errors: they are the successful result of a
//! validation call. The errors below abort a call, either because the
//! metadata is broken or because a collaborator misbehaved.

use beanval_core::CoreError;
use beanval_descriptor::DescriptorError;
use beanval_groups::GroupError;
use beanval_metadata::MetaDataError;
use thiserror::Error;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors that abort a validation call or the construction of a factory.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    MetaData(#[from] MetaDataError),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    InvalidPropertyPath(#[from] CoreError),

    #[error("{type_name} has no property {property}")]
    UnknownProperty { type_name: String, property: String },

    #[error("{type_name} declares no executable {executable}")]
    UnknownExecutable {
        type_name: String,
        executable: String,
    },

    #[error("{executable} expects {expected} arguments, got {actual}")]
    ArgumentCountMismatch {
        executable: String,
        expected: usize,
        actual: usize,
    },

    #[error("No validator for constraint {constraint} on a {value_type} value")]
    NoValidator {
        constraint: String,
        value_type: String,
    },

    #[error("Validator of {constraint} failed at '{path}': {reason}")]
    ValidatorFailed {
        constraint: String,
        path: String,
        reason: String,
    },

    #[error("Traversable resolver failed at '{path}': {reason}")]
    TraversableResolverFailed { path: String, reason: String },

    #[error("Invalid validator configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl ValidationError {
    pub fn unknown_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    pub fn unknown_executable(type_name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self::UnknownExecutable {
            type_name: type_name.into(),
            executable: executable.into(),
        }
    }

    pub fn no_validator(constraint: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self::NoValidator {
            constraint: constraint.into(),
            value_type: value_type.into(),
        }
    }

    pub fn validator_failed(
        constraint: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValidatorFailed {
            constraint: constraint.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by a misbehaving collaborator rather
    /// than by broken metadata.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            ValidationError::ValidatorFailed { .. } | ValidationError::TraversableResolverFailed { .. }
        ) || matches!(self, ValidationError::MetaData(MetaDataError::SequenceProviderFailed { .. }))
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        ValidationError::InvalidConfiguration {
            message: e.to_string(),
        }
    }
}
