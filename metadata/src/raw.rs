//! Unmerged metadata: what one provider knows about one type.

use crate::{MetaConstraint, SequenceProviderRef};
use beanval_core::TypeName;
use beanval_types::{ExecutableKind, Signature, ValueType};
use std::fmt;

/// Where a bean configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationSource {
    Annotation,
    Mapping,
    Api,
}

impl fmt::Display for ConfigurationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigurationSource::Annotation => "annotation",
            ConfigurationSource::Mapping => "mapping",
            ConfigurationSource::Api => "api",
        };
        write!(f, "{}", name)
    }
}

/// Whether a wrapped value (`Optional`) is unwrapped before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnwrapMode {
    /// Unwrap optional values.
    #[default]
    Automatic,
    Unwrap,
    /// Validate the wrapper itself.
    Skip,
}

impl UnwrapMode {
    pub fn unwraps(&self) -> bool {
        !matches!(self, UnwrapMode::Skip)
    }
}

/// Cascading declaration of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadingConfig {
    pub cascading: bool,
    /// `(from, to)` group conversions applied when cascading.
    pub group_conversions: Vec<(TypeName, TypeName)>,
    pub unwrap: UnwrapMode,
}

impl CascadingConfig {
    pub fn cascading() -> Self {
        Self {
            cascading: true,
            ..Self::default()
        }
    }

    /// Returns true if anything is declared.
    pub fn is_declared(&self) -> bool {
        self.cascading || !self.group_conversions.is_empty()
    }

    /// Combine with another declaration of the same element.
    pub fn merge(&mut self, other: &CascadingConfig) {
        self.cascading |= other.cascading;
        for conversion in &other.group_conversions {
            self.group_conversions.push(conversion.clone());
        }
        if other.unwrap != UnwrapMode::Automatic {
            self.unwrap = other.unwrap;
        }
    }
}

/// Class-level constraints.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedType {
    pub constraints: Vec<MetaConstraint>,
}

/// A property (field or getter).
#[derive(Debug, Clone)]
pub struct ConstrainedProperty {
    pub name: String,
    pub value_type: ValueType,
    pub constraints: Vec<MetaConstraint>,
    pub element_constraints: Vec<MetaConstraint>,
    pub cascading: CascadingConfig,
}

impl ConstrainedProperty {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            constraints: Vec::new(),
            element_constraints: Vec::new(),
            cascading: CascadingConfig::default(),
        }
    }

    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty()
            || !self.element_constraints.is_empty()
            || self.cascading.is_declared()
    }
}

/// A method or constructor parameter.
#[derive(Debug, Clone)]
pub struct ConstrainedParameter {
    pub index: usize,
    pub name: String,
    pub value_type: ValueType,
    pub constraints: Vec<MetaConstraint>,
    pub element_constraints: Vec<MetaConstraint>,
    pub cascading: CascadingConfig,
}

impl ConstrainedParameter {
    pub fn new(index: usize, name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            index,
            name: name.into(),
            value_type,
            constraints: Vec::new(),
            element_constraints: Vec::new(),
            cascading: CascadingConfig::default(),
        }
    }

    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty()
            || !self.element_constraints.is_empty()
            || self.cascading.is_declared()
    }
}

/// A method or constructor as declared on one type.
#[derive(Debug, Clone)]
pub struct ConstrainedExecutable {
    pub kind: ExecutableKind,
    pub signature: Signature,
    pub parameters: Vec<ConstrainedParameter>,
    pub cross_parameter_constraints: Vec<MetaConstraint>,
    pub return_value_constraints: Vec<MetaConstraint>,
    pub return_element_constraints: Vec<MetaConstraint>,
    pub return_cascading: CascadingConfig,
    /// None for void methods.
    pub return_type: Option<ValueType>,
    pub is_private: bool,
}

impl ConstrainedExecutable {
    pub fn new(kind: ExecutableKind, signature: Signature, return_type: Option<ValueType>) -> Self {
        Self {
            kind,
            signature,
            parameters: Vec::new(),
            cross_parameter_constraints: Vec::new(),
            return_value_constraints: Vec::new(),
            return_element_constraints: Vec::new(),
            return_cascading: CascadingConfig::default(),
            return_type,
            is_private: false,
        }
    }

    /// Parameter constraints or parameter cascading on any parameter.
    /// Cross-parameter constraints are not counted.
    pub fn has_parameter_constraints(&self) -> bool {
        self.parameters.iter().any(ConstrainedParameter::is_constrained)
    }

    /// Return-value constraints or return-value cascading.
    pub fn is_return_value_constrained(&self) -> bool {
        !self.return_value_constraints.is_empty()
            || !self.return_element_constraints.is_empty()
            || self.return_cascading.is_declared()
    }

    pub fn is_constrained(&self) -> bool {
        self.has_parameter_constraints()
            || !self.cross_parameter_constraints.is_empty()
            || self.is_return_value_constrained()
    }

    pub fn is_void(&self) -> bool {
        self.kind == ExecutableKind::Method && self.return_type.is_none()
    }

    /// Add another provider's declaration of the same executable.
    pub fn merge(&mut self, other: ConstrainedExecutable) {
        for parameter in other.parameters {
            match self.parameters.iter_mut().find(|p| p.index == parameter.index) {
                Some(existing) => {
                    existing.constraints.extend(parameter.constraints);
                    existing.element_constraints.extend(parameter.element_constraints);
                    existing.cascading.merge(&parameter.cascading);
                }
                None => self.parameters.push(parameter),
            }
        }
        self.parameters.sort_by_key(|p| p.index);
        self.cross_parameter_constraints
            .extend(other.cross_parameter_constraints);
        self.return_value_constraints
            .extend(other.return_value_constraints);
        self.return_element_constraints
            .extend(other.return_element_constraints);
        self.return_cascading.merge(&other.return_cascading);
    }
}

/// One element of a bean configuration.
#[derive(Debug, Clone)]
pub enum ConstrainedElement {
    Type(ConstrainedType),
    Property(ConstrainedProperty),
    Executable(ConstrainedExecutable),
}

/// Everything one provider contributes for one type of a hierarchy.
#[derive(Debug, Clone)]
pub struct BeanConfiguration {
    pub source: ConfigurationSource,
    pub bean_type: TypeName,
    pub elements: Vec<ConstrainedElement>,
    pub default_group_sequence: Option<Vec<TypeName>>,
    pub default_group_sequence_provider: Option<SequenceProviderRef>,
}

impl BeanConfiguration {
    pub fn new(source: ConfigurationSource, bean_type: impl Into<TypeName>) -> Self {
        Self {
            source,
            bean_type: bean_type.into(),
            elements: Vec::new(),
            default_group_sequence: None,
            default_group_sequence_provider: None,
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = &ConstrainedProperty> {
        self.elements.iter().filter_map(|e| match e {
            ConstrainedElement::Property(p) => Some(p),
            _ => None,
        })
    }

    pub fn executables(&self) -> impl Iterator<Item = &ConstrainedExecutable> {
        self.elements.iter().filter_map(|e| match e {
            ConstrainedElement::Executable(e) => Some(e),
            _ => None,
        })
    }

    pub fn type_constraints(&self) -> impl Iterator<Item = &MetaConstraint> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                ConstrainedElement::Type(t) => Some(t.constraints.iter()),
                _ => None,
            })
            .flatten()
    }
}
