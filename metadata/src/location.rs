//! Constraint locations and located constraints.

use beanval_core::TypeName;
use beanval_descriptor::ConstraintDescriptor;
use beanval_types::Signature;
use std::fmt;
use std::sync::Arc;

/// The element a constraint is declared on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// The bean itself (class-level constraint).
    Bean,
    /// A property, declared on the field or its getter.
    Property(String),
    Parameter { signature: Signature, index: usize },
    CrossParameter(Signature),
    ReturnValue(Signature),
    /// The elements of a container-typed element.
    ContainerElement(Box<LocationKind>),
}

impl LocationKind {
    /// Returns true for locations read from a bean instance.
    pub fn is_bean_element(&self) -> bool {
        match self {
            LocationKind::Bean | LocationKind::Property(_) => true,
            LocationKind::ContainerElement(parent) => parent.is_bean_element(),
            _ => false,
        }
    }

    /// The property name, looking through container elements.
    pub fn property_name(&self) -> Option<&str> {
        match self {
            LocationKind::Property(name) => Some(name),
            LocationKind::ContainerElement(parent) => parent.property_name(),
            _ => None,
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKind::Bean => write!(f, "<bean>"),
            LocationKind::Property(name) => write!(f, "{}", name),
            LocationKind::Parameter { signature, index } => write!(f, "{}#arg{}", signature, index),
            LocationKind::CrossParameter(signature) => write!(f, "{}#<cross-parameter>", signature),
            LocationKind::ReturnValue(signature) => write!(f, "{}#<return value>", signature),
            LocationKind::ContainerElement(parent) => write!(f, "{}<element>", parent),
        }
    }
}

/// Where a constraint is declared: the declaring type and the element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintLocation {
    pub declaring_type: TypeName,
    pub kind: LocationKind,
}

impl ConstraintLocation {
    pub fn new(declaring_type: impl Into<TypeName>, kind: LocationKind) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            kind,
        }
    }

    /// The same element on another declaring type.
    pub fn with_kind(&self, kind: LocationKind) -> Self {
        Self::new(&self.declaring_type, kind)
    }
}

impl fmt::Display for ConstraintLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type.simple_name(), self.kind)
    }
}

/// A constraint descriptor together with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaConstraint {
    descriptor: Arc<ConstraintDescriptor>,
    location: ConstraintLocation,
}

impl MetaConstraint {
    pub fn new(descriptor: ConstraintDescriptor, location: ConstraintLocation) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            location,
        }
    }

    /// The same descriptor at another location.
    pub fn relocate(&self, kind: LocationKind) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            location: self.location.with_kind(kind),
        }
    }

    pub fn descriptor(&self) -> &Arc<ConstraintDescriptor> {
        &self.descriptor
    }

    pub fn location(&self) -> &ConstraintLocation {
        &self.location
    }

    pub fn declaring_type(&self) -> &TypeName {
        &self.location.declaring_type
    }

    /// Returns true if the constraint is part of the group.
    pub fn belongs_to(&self, group: &TypeName) -> bool {
        self.descriptor.belongs_to(group)
    }
}

impl fmt::Display for MetaConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.descriptor, self.location)
    }
}
