//! Beanval Tests
//!
//! Shared bean fixtures and a scenario runner for the integration tests.
//!
//! Responsibilities:
//! - Build the type models the integration tests validate against
//! - Run named validation steps against one validator factory
//! - Check each step's violations or error with a small assertion builder

pub mod assertion;
pub mod error;
pub mod fixtures;
pub mod scenario;

pub use assertion::Assertion;
pub use error::{TestError, TestResult};
pub use scenario::Scenario;

/// Install a test subscriber once per process. `RUST_LOG` selects what is
/// printed, e.g. `RUST_LOG=beanval_engine=trace`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub mod prelude {
    pub use crate::assertion::Assertion;
    pub use crate::error::{TestError, TestResult};
    pub use crate::fixtures;
    pub use crate::init_tracing;
    pub use crate::scenario::Scenario;

    pub use beanval_core::{names, Annotation, BeanRef, DynamicBean, TypeName, Value};
    pub use beanval_descriptor::{builtin, ConstraintDefinitions};
    pub use beanval_groups::GroupError;
    pub use beanval_engine::{
        ConstraintViolation, ValidationError, ValidationResult, Validator, ValidatorConfig, ValidatorFactory,
        Violations,
    };
    pub use beanval_metadata::{MetaDataError, MethodValidationConfig};
    pub use beanval_types::{
        ConstructorDef, MethodDef, ParameterDef, PropertyDef, Signature, TypeRegistry, TypeRegistryBuilder,
        ValueType,
    };
}
