//! Constraint validators.
//!
//! - `context` - The context a validator reports custom violations to
//! - `factory` - Initialized validators, cached per constraint descriptor
//! - `builtin` - Validators for the built-in constraint definitions

pub mod builtin;
mod context;
mod factory;

pub use context::{ConstraintValidatorContext, CustomViolation, ViolationBuilder};
pub use factory::ConstraintValidatorFactory;

use beanval_core::{TypeName, Value};
use beanval_descriptor::{ConstraintDescriptor, ConstraintType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A validator broke: it could not be initialized or could not decide.
/// Distinct from an invalid value, which is reported as `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidatorFailure(pub String);

impl ValidatorFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Decides whether a value satisfies one constraint.
///
/// A validator is initialized once per constraint descriptor and then
/// shared by every validation call, so `is_valid` must not mutate state.
pub trait ConstraintValidator: Send + Sync {
    fn initialize(&mut self, _descriptor: &ConstraintDescriptor) -> Result<(), ValidatorFailure> {
        Ok(())
    }

    /// Whether this validator can validate values of this kind. `Null` is
    /// always passed to `is_valid`.
    fn supports(&self, _value: &Value) -> bool {
        true
    }

    fn is_valid(
        &self,
        value: &Value,
        context: &mut ConstraintValidatorContext<'_>,
    ) -> Result<bool, ValidatorFailure>;
}

type ValidatorConstructor = Arc<dyn Fn() -> Box<dyn ConstraintValidator> + Send + Sync>;

/// Validator constructors by constraint definition.
///
/// Cross-parameter constraints have their own validators, which receive
/// the arguments of an executable as a `Value::List`.
#[derive(Clone, Default)]
pub struct ConstraintValidators {
    generic: HashMap<TypeName, ValidatorConstructor>,
    cross_parameter: HashMap<TypeName, ValidatorConstructor>,
}

impl ConstraintValidators {
    pub fn new() -> Self {
        Self::default()
    }

    /// The validators of the built-in constraint definitions.
    pub fn with_builtins() -> Self {
        let mut validators = Self::new();
        builtin::register(&mut validators);
        validators
    }

    /// Register the validator of a generic constraint, replacing any
    /// validator registered for the same definition.
    pub fn register<F, V>(&mut self, constraint: impl Into<TypeName>, constructor: F)
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: ConstraintValidator + 'static,
    {
        self.generic
            .insert(constraint.into(), Arc::new(move || -> Box<dyn ConstraintValidator> { Box::new(constructor()) }));
    }

    /// Register the validator of a cross-parameter constraint.
    pub fn register_cross_parameter<F, V>(&mut self, constraint: impl Into<TypeName>, constructor: F)
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: ConstraintValidator + 'static,
    {
        self.cross_parameter
            .insert(constraint.into(), Arc::new(move || -> Box<dyn ConstraintValidator> { Box::new(constructor()) }));
    }

    /// Add all validators of `other`, replacing validators for the same
    /// definitions.
    pub fn extend(&mut self, other: ConstraintValidators) {
        self.generic.extend(other.generic);
        self.cross_parameter.extend(other.cross_parameter);
    }

    pub fn contains(&self, constraint: &TypeName, constraint_type: ConstraintType) -> bool {
        self.constructors(constraint_type).contains_key(constraint)
    }

    pub fn len(&self) -> usize {
        self.generic.len() + self.cross_parameter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn create(
        &self,
        constraint: &TypeName,
        constraint_type: ConstraintType,
    ) -> Option<Box<dyn ConstraintValidator>> {
        self.constructors(constraint_type)
            .get(constraint)
            .map(|constructor| constructor())
    }

    fn constructors(&self, constraint_type: ConstraintType) -> &HashMap<TypeName, ValidatorConstructor> {
        match constraint_type {
            ConstraintType::Generic => &self.generic,
            ConstraintType::CrossParameter => &self.cross_parameter,
        }
    }
}

impl fmt::Debug for ConstraintValidators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut generic: Vec<&str> = self.generic.keys().map(|k| k.as_str()).collect();
        let mut cross_parameter: Vec<&str> = self.cross_parameter.keys().map(|k| k.as_str()).collect();
        generic.sort_unstable();
        cross_parameter.sort_unstable();
        f.debug_struct("ConstraintValidators")
            .field("generic", &generic)
            .field("cross_parameter", &cross_parameter)
            .finish()
    }
}
