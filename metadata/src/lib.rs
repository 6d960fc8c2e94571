//! Beanval Metadata
//!
//! Reads constraint declarations from annotations, JSON mapping documents
//! and the fluent mapping API, and merges them into one immutable
//! `BeanMetaData` per type.
//!
//! Responsibilities:
//! - Read the configuration each provider declares for each type
//! - Apply annotation-ignoring directives to annotation-sourced metadata
//! - Merge configurations over the hierarchy, relocating getter constraints
//!   to their properties
//! - Check the rules for overridden and parallel executables
//! - Resolve each type's default group sequence
//! - Cache metadata per type with first-published-wins semantics

mod aggregated;
mod error;
mod location;
mod manager;
mod options;
pub mod provider;
mod raw;
mod sequence;

pub use aggregated::{
    BeanMetaData, CascadingMetaData, ExecutableMetaData, MethodValidationConfig, ParameterMetaData,
    PropertyMetaData,
};
pub use error::{MetaDataError, MetaDataResult};
pub use location::{ConstraintLocation, LocationKind, MetaConstraint};
pub use manager::BeanMetaDataManager;
pub use options::{AnnotationProcessingOptions, Member};
pub use provider::{
    AnnotationMetaDataProvider, ConstraintMapping, MappingMetaDataProvider, MetaDataProvider,
    ProgrammaticMetaDataProvider,
};
pub use raw::{
    BeanConfiguration, CascadingConfig, ConfigurationSource, ConstrainedElement, ConstrainedExecutable,
    ConstrainedParameter, ConstrainedProperty, ConstrainedType, UnwrapMode,
};
pub use sequence::{
    DefaultGroupSequenceProvider, SequenceProviderError, SequenceProviderRef, SequenceProviders,
};
