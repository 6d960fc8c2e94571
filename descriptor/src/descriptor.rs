//! Immutable constraint descriptors.

use crate::{CompositionType, GROUPS, MESSAGE, PAYLOAD};
use beanval_core::{AttributeValue, TypeName};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Whether a constraint validates an element or an executable's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    Generic,
    CrossParameter,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintType::Generic => write!(f, "GENERIC"),
            ConstraintType::CrossParameter => write!(f, "CROSS_PARAMETER"),
        }
    }
}

/// One applied constraint. Built by `DescriptorBuilder`, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDescriptor {
    pub(crate) definition: TypeName,
    pub(crate) attributes: BTreeMap<String, AttributeValue>,
    pub(crate) groups: Vec<TypeName>,
    pub(crate) payload: Vec<TypeName>,
    pub(crate) composing: Vec<Arc<ConstraintDescriptor>>,
    pub(crate) composition: CompositionType,
    pub(crate) report_as_single_violation: bool,
    pub(crate) constraint_type: ConstraintType,
}

impl ConstraintDescriptor {
    /// Name of the constraint definition.
    pub fn definition(&self) -> &TypeName {
        &self.definition
    }

    /// All attribute values, defaults included.
    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// The message template.
    pub fn message_template(&self) -> &str {
        self.attributes
            .get(MESSAGE)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }

    /// Groups this constraint belongs to, implicit group included.
    pub fn groups(&self) -> &[TypeName] {
        &self.groups
    }

    /// Returns true if the constraint is part of the group.
    pub fn belongs_to(&self, group: &TypeName) -> bool {
        self.groups.contains(group)
    }

    pub fn payload(&self) -> &[TypeName] {
        &self.payload
    }

    pub fn composing_constraints(&self) -> &[Arc<ConstraintDescriptor>] {
        &self.composing
    }

    pub fn is_composed(&self) -> bool {
        !self.composing.is_empty()
    }

    pub fn composition(&self) -> CompositionType {
        self.composition
    }

    pub fn is_report_as_single_violation(&self) -> bool {
        self.report_as_single_violation
    }

    pub fn constraint_type(&self) -> ConstraintType {
        self.constraint_type
    }

    pub fn is_cross_parameter(&self) -> bool {
        self.constraint_type == ConstraintType::CrossParameter
    }
}

impl fmt::Display for ConstraintDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.definition.simple_name())?;
        let shown: Vec<String> = self
            .attributes
            .iter()
            .filter(|(k, _)| ![MESSAGE, GROUPS, PAYLOAD].contains(&k.as_str()))
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if !shown.is_empty() {
            write!(f, "({})", shown.join(", "))?;
        }
        Ok(())
    }
}
