//! Beanval Types
//!
//! The declared type model the engine validates against: classes and
//! interfaces with their annotations, properties, methods and constructors.
//! It is the single source of truth for hierarchy questions (subtyping,
//! linearization, method overriding) and is immutable after construction
//! via TypeRegistryBuilder.

mod builder;
mod registry;
mod types;

pub use builder::{TypeBuilder, TypeError, TypeRegistryBuilder};
pub use registry::TypeRegistry;
pub use types::*;

pub use beanval_core::TypeId;
