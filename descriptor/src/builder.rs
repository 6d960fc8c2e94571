//! Building constraint descriptors from annotations.

use crate::definition::{ConstraintDefinition, GROUPS, PAYLOAD, VALIDATION_APPLIES_TO};
use crate::{
    ConstraintDefinitions, ConstraintDescriptor, ConstraintType, DescriptorError, DescriptorResult,
};
use beanval_core::{Annotation, AttributeValue, TypeName};
use beanval_types::TypeRegistry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The kind of element an annotation was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Type,
    Property,
    Parameter,
    ContainerElement,
    Method {
        has_parameters: bool,
        has_return_value: bool,
    },
    Constructor {
        has_parameters: bool,
    },
}

impl ElementKind {
    fn is_executable(&self) -> bool {
        matches!(self, ElementKind::Method { .. } | ElementKind::Constructor { .. })
    }

    fn has_parameters(&self) -> bool {
        match self {
            ElementKind::Method { has_parameters, .. } => *has_parameters,
            ElementKind::Constructor { has_parameters } => *has_parameters,
            _ => false,
        }
    }

    fn has_return_value(&self) -> bool {
        match self {
            ElementKind::Method {
                has_return_value, ..
            } => *has_return_value,
            // Constructors "return" the created object.
            ElementKind::Constructor { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Type => "type",
            ElementKind::Property => "property",
            ElementKind::Parameter => "parameter",
            ElementKind::ContainerElement => "container element",
            ElementKind::Method { .. } => "method",
            ElementKind::Constructor { .. } => "constructor",
        };
        write!(f, "{}", name)
    }
}

/// Where an annotation was declared.
#[derive(Debug, Clone)]
pub struct DescriptorContext {
    /// The type declaring the annotated element; becomes the implicit group.
    pub declaring_type: TypeName,
    pub element: ElementKind,
}

impl DescriptorContext {
    pub fn new(declaring_type: impl Into<TypeName>, element: ElementKind) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            element,
        }
    }
}

/// Builds immutable descriptors, checking annotations against their definitions.
pub struct DescriptorBuilder<'a> {
    definitions: &'a ConstraintDefinitions,
    types: &'a TypeRegistry,
}

impl<'a> DescriptorBuilder<'a> {
    pub fn new(definitions: &'a ConstraintDefinitions, types: &'a TypeRegistry) -> Self {
        Self { definitions, types }
    }

    /// Returns true if the annotation is a registered constraint.
    pub fn is_constraint(&self, annotation: &Annotation) -> bool {
        self.definitions.is_constraint(&annotation.name)
    }

    /// Build the descriptor for a constraint annotation.
    pub fn build(
        &self,
        annotation: &Annotation,
        context: &DescriptorContext,
    ) -> DescriptorResult<ConstraintDescriptor> {
        self.build_with_type(annotation, context, None)
    }

    fn build_with_type(
        &self,
        annotation: &Annotation,
        context: &DescriptorContext,
        required_type: Option<(&str, ConstraintType)>,
    ) -> DescriptorResult<ConstraintDescriptor> {
        let definition = self
            .definitions
            .get(&annotation.name)
            .ok_or_else(|| DescriptorError::unknown_constraint(annotation.name.as_str()))?;

        let attributes = resolve_attributes(definition, annotation)?;
        let constraint_type = self.constraint_type(definition, &attributes, context, required_type)?;

        let declared_groups = types_attribute(&attributes, GROUPS);
        self.check_groups(definition, &declared_groups)?;
        let groups = effective_groups(&declared_groups, &context.declaring_type);
        let payload = types_attribute(&attributes, PAYLOAD);

        let mut composing = Vec::with_capacity(definition.composing.len());
        for child in &definition.composing {
            let mut child_annotation = child.annotation.clone();
            for (from, to) in &child.overrides {
                if let Some(value) = attributes.get(from) {
                    child_annotation.attributes.insert(to.clone(), value.clone());
                }
            }
            child_annotation
                .attributes
                .insert(GROUPS.to_string(), AttributeValue::Types(declared_groups.clone()));
            child_annotation
                .attributes
                .insert(PAYLOAD.to_string(), AttributeValue::Types(payload.clone()));

            let child_def = self
                .definitions
                .get(&child_annotation.name)
                .ok_or_else(|| DescriptorError::unknown_constraint(child_annotation.name.as_str()))?;
            if child_def.supports_generic() && child_def.supports_cross_parameter() {
                let applies_to = match constraint_type {
                    ConstraintType::Generic => "RETURN_VALUE",
                    ConstraintType::CrossParameter => "PARAMETERS",
                };
                child_annotation = child_annotation.with(VALIDATION_APPLIES_TO, applies_to);
            }

            let child_descriptor =
                self.build_with_type(
                &child_annotation,
                context,
                Some((definition.name.as_str(), constraint_type)),
            )?;
            composing.push(Arc::new(child_descriptor));
        }

        Ok(ConstraintDescriptor {
            definition: definition.name.clone(),
            attributes,
            groups,
            payload,
            composing,
            composition: definition.composition,
            report_as_single_violation: definition.report_as_single_violation,
            constraint_type,
        })
    }

    fn constraint_type(
        &self,
        definition: &ConstraintDefinition,
        attributes: &BTreeMap<String, AttributeValue>,
        context: &DescriptorContext,
        required_type: Option<(&str, ConstraintType)>,
    ) -> DescriptorResult<ConstraintType> {
        let name = definition.name.as_str();
        let element = context.element;
        let generic = definition.supports_generic();
        let cross = definition.supports_cross_parameter();

        let constraint_type = if generic && cross {
            let applies_to = attributes
                .get(VALIDATION_APPLIES_TO)
                .and_then(|v| v.as_str())
                .unwrap_or("IMPLICIT");
            match applies_to {
                "PARAMETERS" => ConstraintType::CrossParameter,
                "RETURN_VALUE" => ConstraintType::Generic,
                "IMPLICIT" if element.is_executable() => {
                    match (element.has_parameters(), element.has_return_value()) {
                        (true, true) => {
                            return Err(DescriptorError::AmbiguousValidationTarget {
                                constraint: name.to_string(),
                                element: element.to_string(),
                            })
                        }
                        (true, false) => ConstraintType::CrossParameter,
                        _ => ConstraintType::Generic,
                    }
                }
                "IMPLICIT" => ConstraintType::Generic,
                other => {
                    return Err(DescriptorError::wrong_attribute_type(
                        name,
                        VALIDATION_APPLIES_TO,
                        "one of IMPLICIT, PARAMETERS, RETURN_VALUE",
                        other,
                    ))
                }
            }
        } else if cross {
            ConstraintType::CrossParameter
        } else {
            ConstraintType::Generic
        };

        if constraint_type == ConstraintType::CrossParameter {
            if !element.is_executable() {
                return Err(DescriptorError::CrossParameterNotAllowed {
                    constraint: name.to_string(),
                    element: element.to_string(),
                });
            }
            if !element.has_parameters() {
                return Err(DescriptorError::illegal_target(
                    name,
                    element.to_string(),
                    "cross-parameter constraints need at least one parameter",
                ));
            }
        }

        if let Some((composed, required)) = required_type {
            if required != constraint_type {
                return Err(DescriptorError::ComposingTypeMismatch {
                    composed: composed.to_string(),
                    composing: name.to_string(),
                    composed_type: required.to_string(),
                    composing_type: constraint_type.to_string(),
                });
            }
        }
        Ok(constraint_type)
    }

    fn check_groups(
        &self,
        definition: &ConstraintDefinition,
        groups: &[TypeName],
    ) -> DescriptorResult<()> {
        for group in groups {
            match self.types.get_type_by_name(group.as_str()) {
                None => {
                    return Err(DescriptorError::UnknownGroup {
                        constraint: definition.name.to_string(),
                        group: group.to_string(),
                    })
                }
                Some(def) if !def.is_interface() => {
                    return Err(DescriptorError::GroupNotInterface {
                        constraint: definition.name.to_string(),
                        group: group.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Check declared attributes against the schema and fill in defaults.
fn resolve_attributes(
    definition: &ConstraintDefinition,
    annotation: &Annotation,
) -> DescriptorResult<BTreeMap<String, AttributeValue>> {
    let name = definition.name.as_str();
    let mut resolved = BTreeMap::new();

    for (key, value) in &annotation.attributes {
        let attr_def = definition
            .attribute_def(key)
            .ok_or_else(|| DescriptorError::unknown_attribute(name, key.as_str()))?;
        let coerced = attr_def.kind.coerce(value).ok_or_else(|| {
            DescriptorError::wrong_attribute_type(
                name,
                key.as_str(),
                attr_def.kind.to_string(),
                value.kind_name(),
            )
        })?;
        resolved.insert(key.clone(), coerced);
    }

    for attr_def in &definition.attributes {
        if resolved.contains_key(&attr_def.name) {
            continue;
        }
        match &attr_def.default {
            Some(default) => {
                resolved.insert(attr_def.name.clone(), default.clone());
            }
            None => {
                return Err(DescriptorError::MissingAttribute {
                    constraint: name.to_string(),
                    attribute: attr_def.name.clone(),
                })
            }
        }
    }
    Ok(resolved)
}

fn types_attribute(attributes: &BTreeMap<String, AttributeValue>, key: &str) -> Vec<TypeName> {
    attributes
        .get(key)
        .and_then(|v| v.as_types())
        .map(|types| types.to_vec())
        .unwrap_or_default()
}

/// No groups means `Default`. A constraint in `Default` is also part of
/// the implicit group named after its declaring type.
fn effective_groups(declared: &[TypeName], declaring_type: &TypeName) -> Vec<TypeName> {
    let mut groups: Vec<TypeName> = Vec::new();
    if declared.is_empty() {
        groups.push(TypeName::default_group());
    } else {
        for group in declared {
            if !groups.contains(group) {
                groups.push(group.clone());
            }
        }
    }
    if groups.iter().any(TypeName::is_default_group) && !groups.contains(declaring_type) {
        groups.push(declaring_type.clone());
    }
    groups
}
