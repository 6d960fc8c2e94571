//! Metadata providers.
//!
//! A provider reads the metadata one source declares for a single type.
//! Providers never merge across the hierarchy; that is the aggregator's job.
//!
//! - `annotation` - Annotations of the type model
//! - `programmatic` - The fluent `ConstraintMapping` API
//! - `json` - JSON mapping documents
//! - `convert` - Shared conversion of mappings into bean configurations

mod annotation;
mod convert;
mod json;
mod programmatic;

pub use annotation::AnnotationMetaDataProvider;
pub use json::MappingMetaDataProvider;
pub use programmatic::{
    ConstraintMapping, CrossParameterMapping, ExecutableMapping, ParameterMapping,
    PropertyMapping, ProgrammaticMetaDataProvider, ReturnValueMapping, TypeMapping,
};

use crate::{AnnotationProcessingOptions, BeanConfiguration, ConfigurationSource, MetaDataResult};
use beanval_types::TypeDef;

/// A source of bean configurations.
pub trait MetaDataProvider: Send + Sync {
    /// The source recorded on the configurations of this provider.
    fn source(&self) -> ConfigurationSource;

    /// The configuration for one type, or None if the provider knows
    /// nothing about it.
    fn bean_configuration(&self, type_def: &TypeDef) -> MetaDataResult<Option<BeanConfiguration>>;

    /// Directives to ignore annotation-declared constraints.
    fn annotation_processing_options(&self) -> AnnotationProcessingOptions {
        AnnotationProcessingOptions::default()
    }
}
