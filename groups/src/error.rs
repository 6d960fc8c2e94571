//! Group definition errors.

use thiserror::Error;

/// Errors raised while computing a validation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("at least one group has to be specified")]
    EmptyGroups,

    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("a group has to be an interface, {0} is not")]
    GroupNotInterface(String),

    #[error("cyclic dependency in groups definition: {sequence}")]
    CyclicSequence { sequence: String },

    #[error("unable to expand group sequence {sequence}: group {group} appears more than once")]
    UnableToExpandSequence { sequence: String, group: String },

    #[error(
        "unable to expand default group list {default_sequence} into sequence {sequence}: \
         group {group} is placed inconsistently"
    )]
    UnableToExpandDefaultSequence {
        default_sequence: String,
        sequence: String,
        group: String,
    },
}

/// Result type for group operations.
pub type GroupResult<T> = Result<T, GroupError>;
