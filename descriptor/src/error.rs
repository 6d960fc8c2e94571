//! Descriptor error types.

use thiserror::Error;

/// Result type for definition and descriptor operations.
pub type DescriptorResult<T> = Result<T, DescriptorError>;

/// Errors in constraint definitions or in annotations applying them.
/// All of them are structural and reported when metadata is built.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Duplicate constraint definition: {name}")]
    DuplicateDefinition { name: String },

    #[error("Unknown constraint: {name}")]
    UnknownConstraint { name: String },

    #[error("Constraint {constraint} declares illegal attribute '{attribute}': {reason}")]
    IllegalAttributeDeclaration {
        constraint: String,
        attribute: String,
        reason: String,
    },

    #[error("Constraint {constraint} has no attribute '{attribute}'")]
    UnknownAttribute { constraint: String, attribute: String },

    #[error("Attribute '{attribute}' of {constraint} expects {expected}, got {actual}")]
    WrongAttributeType {
        constraint: String,
        attribute: String,
        expected: String,
        actual: String,
    },

    #[error("Attribute '{attribute}' of {constraint} has no value and no default")]
    MissingAttribute { constraint: String, attribute: String },

    #[error("Invalid override in {constraint}: {reason}")]
    InvalidOverride { constraint: String, reason: String },

    #[error("Group {group} used by {constraint} is not a known type")]
    UnknownGroup { constraint: String, group: String },

    #[error("Group {group} used by {constraint} is not an interface")]
    GroupNotInterface { constraint: String, group: String },

    #[error("Cross-parameter constraint {constraint} is not allowed on {element}")]
    CrossParameterNotAllowed { constraint: String, element: String },

    #[error("Constraint {constraint} cannot be applied to {element}: {reason}")]
    IllegalTarget {
        constraint: String,
        element: String,
        reason: String,
    },

    #[error(
        "Constraint {constraint} is ambiguous on {element}: it applies to parameters and \
         return values, set validation_applies_to"
    )]
    AmbiguousValidationTarget { constraint: String, element: String },

    #[error(
        "Composing constraint {composing} of {composed} has a different constraint type \
         ({composing_type} vs {composed_type})"
    )]
    ComposingTypeMismatch {
        composed: String,
        composing: String,
        composed_type: String,
        composing_type: String,
    },
}

impl DescriptorError {
    pub fn unknown_constraint(name: impl Into<String>) -> Self {
        Self::UnknownConstraint { name: name.into() }
    }

    pub fn illegal_attribute(
        constraint: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::IllegalAttributeDeclaration {
            constraint: constraint.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_attribute(constraint: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            constraint: constraint.into(),
            attribute: attribute.into(),
        }
    }

    pub fn wrong_attribute_type(
        constraint: impl Into<String>,
        attribute: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::WrongAttributeType {
            constraint: constraint.into(),
            attribute: attribute.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_override(constraint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOverride {
            constraint: constraint.into(),
            reason: reason.into(),
        }
    }

    pub fn illegal_target(
        constraint: impl Into<String>,
        element: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::IllegalTarget {
            constraint: constraint.into(),
            element: element.into(),
            reason: reason.into(),
        }
    }
}
