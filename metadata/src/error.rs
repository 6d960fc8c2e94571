//! Metadata error types.

use beanval_descriptor::DescriptorError;
use beanval_groups::GroupError;
use beanval_types::TypeError;
use thiserror::Error;

/// Result type for metadata operations.
pub type MetaDataResult<T> = Result<T, MetaDataError>;

/// Definition errors found while reading or aggregating bean metadata.
#[derive(Debug, Error)]
pub enum MetaDataError {
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    #[error("Invalid constraint on {type_name}.{element}: {source}")]
    InvalidConstraint {
        type_name: String,
        element: String,
        #[source]
        source: DescriptorError,
    },

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(
        "Incorrect method parameters, overriding: {method} declared on {declaring_type} \
         must not alter parameter constraints of the method it overrides on {overridden}"
    )]
    ParameterConstraintsAltered {
        method: String,
        declaring_type: String,
        overridden: String,
    },

    #[error(
        "Parallel implementation: parameter constraints of {method} must not be declared \
         when it is implemented from parallel types {}",
        types.join(", ")
    )]
    ParallelParameterConstraints { method: String, types: Vec<String> },

    #[error("Void method {method} on {declaring_type} must not be return value constrained")]
    VoidMethodConstrained {
        method: String,
        declaring_type: String,
    },

    #[error(
        "Return value of {method} on {declaring_type} is marked for cascaded validation \
         also on {overridden}"
    )]
    ReturnValueCascadedTwice {
        method: String,
        declaring_type: String,
        overridden: String,
    },

    #[error(
        "Group conversions must not be defined for the cascaded return value of {method} \
         implemented from parallel types {}",
        types.join(", ")
    )]
    ParallelGroupConversion { method: String, types: Vec<String> },

    #[error("Default group sequence of {type_name} is defined more than once")]
    MultipleDefaultSequences { type_name: String },

    #[error("{type_name} defines both a default group sequence and a sequence provider")]
    SequenceAndProvider { type_name: String },

    #[error("Default must not be part of the redefined default group sequence of {type_name}")]
    DefaultInSequence { type_name: String },

    #[error("{type_name} must be part of its redefined default group sequence")]
    BeanClassNotInSequence { type_name: String },

    #[error("Unknown group sequence provider '{key}' on {type_name}")]
    UnknownSequenceProvider { type_name: String, key: String },

    #[error("Group sequence provider of {type_name} failed: {reason}")]
    SequenceProviderFailed { type_name: String, reason: String },

    #[error("Group conversion on {type_name}.{element} requires cascaded validation")]
    ConversionWithoutCascade { type_name: String, element: String },

    #[error("Group {from} is converted more than once on {type_name}.{element}")]
    DuplicateConversion {
        type_name: String,
        element: String,
        from: String,
    },

    #[error("Group sequence {from} must not be the source of a group conversion on {type_name}.{element}")]
    ConversionFromSequence {
        type_name: String,
        element: String,
        from: String,
    },

    #[error("Bean {type_name} is mapped more than once")]
    BeanMappedTwice { type_name: String },

    #[error("Unknown member {member} mapped on {type_name}")]
    UnknownMember { type_name: String, member: String },

    #[error("Invalid mapping document: {message}")]
    InvalidMapping { message: String },
}

impl MetaDataError {
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    pub fn invalid_constraint(
        type_name: impl Into<String>,
        element: impl Into<String>,
        source: DescriptorError,
    ) -> Self {
        Self::InvalidConstraint {
            type_name: type_name.into(),
            element: element.into(),
            source,
        }
    }

    pub fn parameter_constraints_altered(
        method: impl Into<String>,
        declaring_type: impl Into<String>,
        overridden: impl Into<String>,
    ) -> Self {
        Self::ParameterConstraintsAltered {
            method: method.into(),
            declaring_type: declaring_type.into(),
            overridden: overridden.into(),
        }
    }

    pub fn return_value_cascaded_twice(
        method: impl Into<String>,
        declaring_type: impl Into<String>,
        overridden: impl Into<String>,
    ) -> Self {
        Self::ReturnValueCascadedTwice {
            method: method.into(),
            declaring_type: declaring_type.into(),
            overridden: overridden.into(),
        }
    }

    pub fn conversion_without_cascade(type_name: impl Into<String>, element: impl Into<String>) -> Self {
        Self::ConversionWithoutCascade {
            type_name: type_name.into(),
            element: element.into(),
        }
    }

    pub fn unknown_member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self::UnknownMember {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        Self::InvalidMapping {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for MetaDataError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidMapping {
            message: e.to_string(),
        }
    }
}
