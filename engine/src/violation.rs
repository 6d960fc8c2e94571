//! Constraint violation types.

use beanval_core::{BeanRef, Path, TypeName, Value};
use beanval_descriptor::ConstraintDescriptor;
use std::fmt;
use std::sync::Arc;

/// A failed constraint.
#[derive(Debug, Clone)]
pub struct ConstraintViolation {
    /// The interpolated message.
    pub message: String,
    /// The message template before interpolation.
    pub message_template: String,
    /// The validated root bean, absent for `validate_value` and constructor
    /// parameters.
    pub root_bean: Option<BeanRef>,
    pub root_bean_type: TypeName,
    /// The bean hosting the failed element.
    pub leaf_bean: Option<BeanRef>,
    /// The value that failed the constraint.
    pub invalid_value: Value,
    pub property_path: Path,
    /// The constraint that failed.
    pub descriptor: Arc<ConstraintDescriptor>,
    /// The arguments of a validated executable.
    pub executable_parameters: Option<Vec<Value>>,
    /// The return value of a validated executable.
    pub executable_return_value: Option<Value>,
}

impl ConstraintViolation {
    pub fn new(
        message: impl Into<String>,
        message_template: impl Into<String>,
        root_bean_type: impl Into<TypeName>,
        property_path: Path,
        invalid_value: Value,
        descriptor: Arc<ConstraintDescriptor>,
    ) -> Self {
        Self {
            message: message.into(),
            message_template: message_template.into(),
            root_bean: None,
            root_bean_type: root_bean_type.into(),
            leaf_bean: None,
            invalid_value,
            property_path,
            descriptor,
            executable_parameters: None,
            executable_return_value: None,
        }
    }

    pub fn with_root_bean(mut self, root_bean: Option<BeanRef>) -> Self {
        self.root_bean = root_bean;
        self
    }

    pub fn with_leaf_bean(mut self, leaf_bean: Option<BeanRef>) -> Self {
        self.leaf_bean = leaf_bean;
        self
    }

    pub fn with_executable_parameters(mut self, parameters: Option<Vec<Value>>) -> Self {
        self.executable_parameters = parameters;
        self
    }

    pub fn with_executable_return_value(mut self, return_value: Option<Value>) -> Self {
        self.executable_return_value = return_value;
        self
    }

    /// The property path as a string, e.g. `customer.name`.
    pub fn path(&self) -> String {
        self.property_path.to_string()
    }

    /// Name of the failed constraint's definition.
    pub fn constraint(&self) -> &TypeName {
        self.descriptor.definition()
    }
}

// Beans compare by identity; descriptors by identity first to keep
// comparisons cheap for the common case.
impl PartialEq for ConstraintViolation {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.message_template == other.message_template
            && self.property_path == other.property_path
            && self.root_bean_type == other.root_bean_type
            && self.root_bean == other.root_bean
            && self.leaf_bean == other.leaf_bean
            && self.invalid_value == other.invalid_value
            && (Arc::ptr_eq(&self.descriptor, &other.descriptor) || self.descriptor == other.descriptor)
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path();
        if path.is_empty() {
            write!(f, "{}: {}", self.root_bean_type.simple_name(), self.message)
        } else {
            write!(f, "{}: {}", path, self.message)
        }
    }
}

/// The violations of one validation call. Equal violations are kept once.
#[derive(Debug, Clone, Default)]
pub struct Violations {
    violations: Vec<ConstraintViolation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a violation unless an equal one is present. Returns true if it
    /// was added.
    pub fn push(&mut self, violation: ConstraintViolation) -> bool {
        if self.violations.contains(&violation) {
            return false;
        }
        self.violations.push(violation);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn all(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintViolation> {
        self.violations.iter()
    }

    /// Violations reported on the given path.
    pub fn at(&self, path: &str) -> impl Iterator<Item = &ConstraintViolation> + '_ {
        let path = path.to_string();
        self.violations.iter().filter(move |v| v.path() == path)
    }

    /// The paths of all violations, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.violations.iter().map(|v| v.path()).collect();
        paths.sort();
        paths
    }

    /// Merge another collection, dropping duplicates.
    pub fn merge(&mut self, other: Violations) {
        for violation in other.violations {
            self.push(violation);
        }
    }
}

impl IntoIterator for Violations {
    type Item = ConstraintViolation;
    type IntoIter = std::vec::IntoIter<ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a ConstraintViolation;
    type IntoIter = std::slice::Iter<'a, ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
