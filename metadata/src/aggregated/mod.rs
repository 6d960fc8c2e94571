//! Aggregated bean metadata.
//!
//! - `bean` - `BeanMetaData`, merged over the hierarchy and all providers
//! - `property` - Property metadata and cascading declarations
//! - `executable` - Method and constructor metadata
//! - `rules` - Rules for executables declared on several types

mod bean;
mod executable;
mod property;
mod rules;

pub use bean::BeanMetaData;
pub use executable::{ExecutableMetaData, ParameterMetaData};
pub use property::{CascadingMetaData, PropertyMetaData};
pub use rules::MethodValidationConfig;
