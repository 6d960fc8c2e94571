//! Beanval Engine
//!
//! Validates beans, properties, values and executable calls against the
//! constraints the metadata declares.
//!
//! Responsibilities:
//! - Build validator factories from types, definitions, mappings and configuration
//! - Walk the validation order: flat groups, then sequences step by step
//! - Validate the default group along each class's own or redefined sequence
//! - Cascade into beans and container elements without revisiting a bean
//! - Evaluate composed constraints and report violations with interpolated messages
//! - Validate method and constructor parameters and return values

pub mod constraint;
mod config;
mod error;
mod factory;
mod interpolator;
mod resolver;
mod run;
mod validator;
mod violation;

pub use config::ValidatorConfig;
pub use constraint::{
    ConstraintValidator, ConstraintValidatorContext, ConstraintValidatorFactory, ConstraintValidators,
    CustomViolation, ValidatorFailure, ViolationBuilder,
};
pub use error::{ValidationError, ValidationResult};
pub use factory::{ValidatorContext, ValidatorFactory, ValidatorFactoryBuilder};
pub use interpolator::{MessageContext, MessageInterpolator, ParameterMessageInterpolator};
pub use resolver::{ElementType, ResolverFailure, TraversableResolver, Traversal, TraverseAll};
pub use validator::Validator;
pub use violation::{ConstraintViolation, Violations};
