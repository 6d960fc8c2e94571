//! Beanval Descriptor
//!
//! The constraint descriptor model.
//!
//! Responsibilities:
//! - Declare constraint definitions (attribute schema, composition, targets)
//! - Validate definitions when they are registered
//! - Build immutable constraint descriptors from annotations
//! - Provide the built-in constraint definitions

mod builder;
pub mod builtin;
mod definition;
mod definitions;
mod descriptor;
mod error;

pub use builder::{DescriptorBuilder, DescriptorContext, ElementKind};
pub use definition::{
    AttributeDef, AttributeKind, ComposingConstraint, CompositionType, ConstraintDefinition,
    ValidationTarget, GROUPS, MESSAGE, PAYLOAD, VALIDATION_APPLIES_TO,
};
pub use definitions::ConstraintDefinitions;
pub use descriptor::{ConstraintDescriptor, ConstraintType};
pub use error::{DescriptorError, DescriptorResult};
