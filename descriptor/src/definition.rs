//! Constraint definitions: the schema side of a constraint annotation.

use beanval_core::{Annotation, AttributeValue, TypeName};
use std::fmt;

/// Reserved attribute holding the message template.
pub const MESSAGE: &str = "message";
/// Reserved attribute holding the groups a constraint belongs to.
pub const GROUPS: &str = "groups";
/// Reserved attribute holding payload types.
pub const PAYLOAD: &str = "payload";
/// Reserved attribute selecting parameters or return value for
/// constraints that support both.
pub const VALIDATION_APPLIES_TO: &str = "validation_applies_to";

/// Kind of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Bool,
    Int,
    Float,
    String,
    Strings,
    Type,
    Types,
}

impl AttributeKind {
    /// Convert a declared value to this kind. Strings name types where a
    /// type is expected; single values are widened to lists.
    pub fn coerce(&self, value: &AttributeValue) -> Option<AttributeValue> {
        match (self, value) {
            (AttributeKind::Bool, AttributeValue::Bool(_))
            | (AttributeKind::Int, AttributeValue::Int(_))
            | (AttributeKind::Float, AttributeValue::Float(_))
            | (AttributeKind::String, AttributeValue::String(_))
            | (AttributeKind::Strings, AttributeValue::Strings(_))
            | (AttributeKind::Type, AttributeValue::Type(_))
            | (AttributeKind::Types, AttributeValue::Types(_)) => Some(value.clone()),
            (AttributeKind::Float, AttributeValue::Int(i)) => Some(AttributeValue::Float(*i as f64)),
            (AttributeKind::Strings, AttributeValue::String(s)) => {
                Some(AttributeValue::Strings(vec![s.clone()]))
            }
            (AttributeKind::Type, AttributeValue::String(s)) => {
                Some(AttributeValue::Type(TypeName::new(s)))
            }
            (AttributeKind::Types, AttributeValue::Type(t)) => {
                Some(AttributeValue::Types(vec![t.clone()]))
            }
            (AttributeKind::Types, AttributeValue::String(s)) => {
                Some(AttributeValue::Types(vec![TypeName::new(s)]))
            }
            (AttributeKind::Types, AttributeValue::Strings(items)) => Some(AttributeValue::Types(
                items.iter().map(TypeName::new).collect(),
            )),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::Bool => "Bool",
            AttributeKind::Int => "Int",
            AttributeKind::Float => "Float",
            AttributeKind::String => "String",
            AttributeKind::Strings => "Strings",
            AttributeKind::Type => "Type",
            AttributeKind::Types => "Types",
        };
        write!(f, "{}", name)
    }
}

/// One attribute of a constraint definition.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    pub name: String,
    pub kind: AttributeKind,
    pub default: Option<AttributeValue>,
}

/// How the results of composing constraints are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionType {
    /// All composing constraints must pass.
    #[default]
    And,
    /// At least one composing constraint must pass.
    Or,
    /// All composing constraints must fail.
    AllFalse,
}

/// What a constraint can validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationTarget {
    /// The annotated element: property, parameter, return value or bean.
    AnnotatedElement,
    /// The parameter array of a method or constructor.
    Parameters,
}

/// A constraint a composed constraint is built from.
#[derive(Debug, Clone)]
pub struct ComposingConstraint {
    pub annotation: Annotation,
    /// `(composed attribute, composing attribute)`: the composed constraint's
    /// value is copied into the composing constraint.
    pub overrides: Vec<(String, String)>,
}

impl ComposingConstraint {
    pub fn new(annotation: Annotation) -> Self {
        Self {
            annotation,
            overrides: Vec::new(),
        }
    }

    /// Copy the composed constraint's `from` attribute into this constraint's `to`.
    pub fn override_attribute(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.overrides.push((from.into(), to.into()));
        self
    }
}

/// The definition of a constraint annotation type.
#[derive(Debug, Clone)]
pub struct ConstraintDefinition {
    pub name: TypeName,
    pub attributes: Vec<AttributeDef>,
    pub composing: Vec<ComposingConstraint>,
    pub composition: CompositionType,
    pub report_as_single_violation: bool,
    pub targets: Vec<ValidationTarget>,
}

impl ConstraintDefinition {
    /// Create a definition with the reserved attributes and a generic
    /// default message.
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            attributes: vec![
                AttributeDef {
                    name: MESSAGE.to_string(),
                    kind: AttributeKind::String,
                    default: Some(AttributeValue::String("is invalid".to_string())),
                },
                AttributeDef {
                    name: GROUPS.to_string(),
                    kind: AttributeKind::Types,
                    default: Some(AttributeValue::Types(Vec::new())),
                },
                AttributeDef {
                    name: PAYLOAD.to_string(),
                    kind: AttributeKind::Types,
                    default: Some(AttributeValue::Types(Vec::new())),
                },
            ],
            composing: Vec::new(),
            composition: CompositionType::And,
            report_as_single_violation: false,
            targets: vec![ValidationTarget::AnnotatedElement],
        }
    }

    /// Add or replace an attribute with a default value.
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        kind: AttributeKind,
        default: impl Into<AttributeValue>,
    ) -> Self {
        self.put_attribute(name.into(), kind, Some(default.into()));
        self
    }

    /// Add an attribute that every usage must set.
    pub fn required_attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.put_attribute(name.into(), kind, None);
        self
    }

    fn put_attribute(&mut self, name: String, kind: AttributeKind, default: Option<AttributeValue>) {
        self.attributes.retain(|a| a.name != name);
        self.attributes.push(AttributeDef {
            name,
            kind,
            default,
        });
    }

    /// Set the default message template.
    pub fn message(mut self, template: impl Into<String>) -> Self {
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == MESSAGE) {
            attr.default = Some(AttributeValue::String(template.into()));
        }
        self
    }

    /// Add a composing constraint.
    pub fn composed_of(mut self, composing: ComposingConstraint) -> Self {
        self.composing.push(composing);
        self
    }

    /// Set how composing constraints are combined.
    pub fn composition(mut self, composition: CompositionType) -> Self {
        self.composition = composition;
        self
    }

    /// Report only the composed constraint when any composing one fails.
    pub fn report_as_single_violation(mut self) -> Self {
        self.report_as_single_violation = true;
        self
    }

    /// Set the supported validation targets. A definition supporting both
    /// gets the reserved `validation_applies_to` attribute.
    pub fn targets(mut self, targets: &[ValidationTarget]) -> Self {
        self.targets = targets.to_vec();
        if self.supports_generic() && self.supports_cross_parameter() {
            self.put_attribute(
                VALIDATION_APPLIES_TO.to_string(),
                AttributeKind::String,
                Some(AttributeValue::String("IMPLICIT".to_string())),
            );
        }
        self
    }

    pub fn supports_generic(&self) -> bool {
        self.targets.contains(&ValidationTarget::AnnotatedElement)
    }

    pub fn supports_cross_parameter(&self) -> bool {
        self.targets.contains(&ValidationTarget::Parameters)
    }

    pub fn attribute_def(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn is_composed(&self) -> bool {
        !self.composing.is_empty()
    }
}
