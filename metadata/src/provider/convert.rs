//! Reading constraints and cascading declarations, and turning constraint
//! mappings into bean configurations.

use super::programmatic::{ExecutableMapping, PropertyMapping, TypeMapping};
use crate::{
    AnnotationProcessingOptions, BeanConfiguration, CascadingConfig, ConfigurationSource,
    ConstrainedElement, ConstrainedExecutable, ConstrainedParameter, ConstrainedProperty,
    ConstrainedType, ConstraintLocation, LocationKind, Member, MetaConstraint, MetaDataError,
    MetaDataResult, SequenceProviders, UnwrapMode,
};
use beanval_core::{names, Annotation, AttributeValue, TypeName};
use beanval_descriptor::{
    ConstraintDefinitions, ConstraintType, DescriptorBuilder, DescriptorContext, DescriptorError,
    ElementKind, VALIDATION_APPLIES_TO,
};
use beanval_types::{ExecutableKind, ParameterDef, Signature, TypeDef, TypeRegistry, ValueType};

/// Builds located constraints for the elements of one declaring type.
pub(crate) struct ConstraintReader<'a> {
    builder: DescriptorBuilder<'a>,
    definitions: &'a ConstraintDefinitions,
    declaring_type: &'a TypeName,
    /// Reject annotations that are not constraints instead of skipping them.
    strict: bool,
}

impl<'a> ConstraintReader<'a> {
    pub(crate) fn new(
        definitions: &'a ConstraintDefinitions,
        types: &'a TypeRegistry,
        declaring_type: &'a TypeName,
        strict: bool,
    ) -> Self {
        Self {
            builder: DescriptorBuilder::new(definitions, types),
            definitions,
            declaring_type,
            strict,
        }
    }

    /// Build the constraints among `annotations`, placing each by its
    /// constraint type.
    pub(crate) fn read(
        &self,
        annotations: &[Annotation],
        element: ElementKind,
        label: &str,
        locate: &dyn Fn(ConstraintType) -> LocationKind,
    ) -> MetaDataResult<Vec<MetaConstraint>> {
        let context = DescriptorContext::new(self.declaring_type, element);
        let mut constraints = Vec::new();
        for annotation in annotations {
            if !self.strict && !self.builder.is_constraint(annotation) {
                continue;
            }
            let descriptor = self
                .builder
                .build(annotation, &context)
                .map_err(|e| MetaDataError::invalid_constraint(self.declaring_type.as_str(), label, e))?;
            let location = ConstraintLocation::new(self.declaring_type, locate(descriptor.constraint_type()));
            constraints.push(MetaConstraint::new(descriptor, location));
        }
        Ok(constraints)
    }

    /// Build constraints that must all be of `required` type. Constraints
    /// supporting both targets are pinned to it.
    pub(crate) fn read_as(
        &self,
        annotations: &[Annotation],
        element: ElementKind,
        label: &str,
        required: ConstraintType,
        kind: LocationKind,
    ) -> MetaDataResult<Vec<MetaConstraint>> {
        let applies_to = match required {
            ConstraintType::Generic => "RETURN_VALUE",
            ConstraintType::CrossParameter => "PARAMETERS",
        };
        let pinned: Vec<Annotation> = annotations
            .iter()
            .map(|a| match self.definitions.get(&a.name) {
                Some(def) if def.supports_generic() && def.supports_cross_parameter() => {
                    a.clone().with(VALIDATION_APPLIES_TO, applies_to)
                }
                _ => a.clone(),
            })
            .collect();

        let constraints = self.read(&pinned, element, label, &|_| kind.clone())?;
        for constraint in &constraints {
            let actual = constraint.descriptor().constraint_type();
            if actual != required {
                return Err(MetaDataError::invalid_constraint(
                    self.declaring_type.as_str(),
                    label,
                    DescriptorError::illegal_target(
                        constraint.descriptor().definition().as_str(),
                        label,
                        format!("expected a {} constraint, found {}", required, actual),
                    ),
                ));
            }
        }
        Ok(constraints)
    }
}

/// `Valid`, `ConvertGroup` and `UnwrapValidatedValue` among annotations.
pub(crate) fn read_cascading(annotations: &[Annotation]) -> CascadingConfig {
    let mut config = CascadingConfig::default();
    for annotation in annotations {
        if annotation.is(names::VALID) {
            config.cascading = true;
        } else if annotation.is(names::CONVERT_GROUP) {
            let from = annotation.attribute("from").and_then(AttributeValue::as_type);
            let to = annotation.attribute("to").and_then(AttributeValue::as_type);
            if let (Some(from), Some(to)) = (from, to) {
                config.group_conversions.push((from.clone(), to.clone()));
            }
        } else if annotation.is(names::UNWRAP_VALIDATED_VALUE) {
            config.unwrap = unwrap_mode(annotation.attribute("value").and_then(AttributeValue::as_bool));
        }
    }
    config
}

pub(crate) fn unwrap_mode(unwrap: Option<bool>) -> UnwrapMode {
    match unwrap {
        Some(true) => UnwrapMode::Unwrap,
        Some(false) => UnwrapMode::Skip,
        None => UnwrapMode::Automatic,
    }
}

pub(crate) fn method_element(parameters: &[ParameterDef], return_type: Option<&ValueType>) -> ElementKind {
    ElementKind::Method {
        has_parameters: !parameters.is_empty(),
        has_return_value: return_type.is_some(),
    }
}

pub(crate) fn constructor_element(parameters: &[ParameterDef]) -> ElementKind {
    ElementKind::Constructor {
        has_parameters: !parameters.is_empty(),
    }
}

/// Turns type mappings of one provider into bean configurations.
pub(crate) struct MappingConverter<'a> {
    pub types: &'a TypeRegistry,
    pub definitions: &'a ConstraintDefinitions,
    pub sequence_providers: &'a SequenceProviders,
    pub source: ConfigurationSource,
}

impl<'a> MappingConverter<'a> {
    pub(crate) fn convert(
        &self,
        mapping: &TypeMapping,
        options: &mut AnnotationProcessingOptions,
    ) -> MetaDataResult<BeanConfiguration> {
        let type_def = self
            .types
            .get_type_by_name(mapping.name.as_str())
            .ok_or_else(|| MetaDataError::unknown_type(mapping.name.as_str()))?;
        let bean = &type_def.name;
        let reader = ConstraintReader::new(self.definitions, self.types, bean, true);
        let mut config = BeanConfiguration::new(self.source, bean);

        if let Some(ignore) = mapping.ignore_annotations {
            options.ignore_annotations(bean, ignore);
        }
        if let Some(ignore) = mapping.ignore_class_level {
            options.ignore_class_level(bean, ignore);
        }

        let class_constraints =
            reader.read(&mapping.constraints, ElementKind::Type, "<class>", &|_| LocationKind::Bean)?;
        config
            .elements
            .push(ConstrainedElement::Type(ConstrainedType {
                constraints: class_constraints,
            }));

        config.default_group_sequence = mapping.default_group_sequence.clone();
        if let Some(key) = &mapping.default_group_sequence_provider {
            let provider = self.sequence_providers.get(key).ok_or_else(|| {
                MetaDataError::UnknownSequenceProvider {
                    type_name: bean.to_string(),
                    key: key.clone(),
                }
            })?;
            config.default_group_sequence_provider = Some(provider);
        }

        for property in &mapping.properties {
            let element = self.convert_property(type_def, &reader, property, options)?;
            config.elements.push(ConstrainedElement::Property(element));
        }
        for method in &mapping.methods {
            let element = self.convert_method(type_def, &reader, method, options)?;
            config.elements.push(ConstrainedElement::Executable(element));
        }
        for constructor in &mapping.constructors {
            let element = self.convert_constructor(type_def, &reader, constructor, options)?;
            config.elements.push(ConstrainedElement::Executable(element));
        }
        Ok(config)
    }

    fn convert_property(
        &self,
        type_def: &TypeDef,
        reader: &ConstraintReader<'_>,
        mapping: &PropertyMapping,
        options: &mut AnnotationProcessingOptions,
    ) -> MetaDataResult<ConstrainedProperty> {
        let name = mapping.name.as_str();
        let value_type = type_def
            .property(name)
            .map(|p| p.value_type.clone())
            .or_else(|| {
                type_def
                    .methods
                    .iter()
                    .find(|m| m.getter_property_name().as_deref() == Some(name))
                    .and_then(|m| m.return_type.clone())
            })
            .ok_or_else(|| MetaDataError::unknown_member(type_def.name.as_str(), name))?;

        if let Some(ignore) = mapping.ignore_annotations {
            options.ignore_member(&type_def.name, Member::Property(name.to_string()), ignore);
        }

        let location = LocationKind::Property(name.to_string());
        let mut property = ConstrainedProperty::new(name, value_type);
        property.constraints =
            reader.read(&mapping.constraints, ElementKind::Property, name, &|_| location.clone())?;
        property.element_constraints = reader.read(
            &mapping.element_constraints,
            ElementKind::ContainerElement,
            name,
            &|_| LocationKind::ContainerElement(Box::new(location.clone())),
        )?;
        property.cascading = CascadingConfig {
            cascading: mapping.cascading,
            group_conversions: mapping.group_conversions.clone(),
            unwrap: unwrap_mode(mapping.unwrap),
        };
        Ok(property)
    }

    fn convert_method(
        &self,
        type_def: &TypeDef,
        reader: &ConstraintReader<'_>,
        mapping: &ExecutableMapping,
        options: &mut AnnotationProcessingOptions,
    ) -> MetaDataResult<ConstrainedExecutable> {
        let method = type_def
            .method(&mapping.signature)
            .ok_or_else(|| MetaDataError::unknown_member(type_def.name.as_str(), mapping.signature.to_string()))?;
        let element = method_element(&method.parameters, method.return_type.as_ref());
        let mut executable = ConstrainedExecutable::new(
            ExecutableKind::Method,
            mapping.signature.clone(),
            method.return_type.clone(),
        );
        executable.is_private = method.is_private();
        self.convert_executable(type_def, reader, mapping, &method.parameters, element, &mut executable, options)?;
        Ok(executable)
    }

    fn convert_constructor(
        &self,
        type_def: &TypeDef,
        reader: &ConstraintReader<'_>,
        mapping: &ExecutableMapping,
        options: &mut AnnotationProcessingOptions,
    ) -> MetaDataResult<ConstrainedExecutable> {
        let constructor = type_def
            .constructor(&mapping.signature)
            .ok_or_else(|| MetaDataError::unknown_member(type_def.name.as_str(), mapping.signature.to_string()))?;
        let element = constructor_element(&constructor.parameters);
        let mut executable = ConstrainedExecutable::new(
            ExecutableKind::Constructor,
            mapping.signature.clone(),
            Some(ValueType::Named(type_def.name.clone())),
        );
        self.convert_executable(
            type_def,
            reader,
            mapping,
            &constructor.parameters,
            element,
            &mut executable,
            options,
        )?;
        Ok(executable)
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_executable(
        &self,
        type_def: &TypeDef,
        reader: &ConstraintReader<'_>,
        mapping: &ExecutableMapping,
        parameters: &[ParameterDef],
        element: ElementKind,
        executable: &mut ConstrainedExecutable,
        options: &mut AnnotationProcessingOptions,
    ) -> MetaDataResult<()> {
        let bean = &type_def.name;
        let signature = &mapping.signature;
        let label = signature.to_string();

        if let Some(ignore) = mapping.ignore_annotations {
            options.ignore_member(bean, Member::Executable(signature.clone()), ignore);
        }

        for parameter in &mapping.parameters {
            let def = parameters.get(parameter.index).ok_or_else(|| {
                MetaDataError::unknown_member(bean.as_str(), format!("{}#arg{}", signature, parameter.index))
            })?;
            if let Some(ignore) = parameter.ignore_annotations {
                options.ignore_parameter(bean, signature.clone(), parameter.index, ignore);
            }
            let location = LocationKind::Parameter {
                signature: signature.clone(),
                index: parameter.index,
            };
            let mut constrained = ConstrainedParameter::new(parameter.index, &def.name, def.value_type.clone());
            constrained.constraints =
                reader.read(&parameter.constraints, ElementKind::Parameter, &def.name, &|_| location.clone())?;
            constrained.element_constraints = reader.read(
                &parameter.element_constraints,
                ElementKind::ContainerElement,
                &def.name,
                &|_| LocationKind::ContainerElement(Box::new(location.clone())),
            )?;
            constrained.cascading = CascadingConfig {
                cascading: parameter.cascading,
                group_conversions: parameter.group_conversions.clone(),
                unwrap: UnwrapMode::Automatic,
            };
            executable.parameters.push(constrained);
        }
        executable.parameters.sort_by_key(|p| p.index);

        let cross = &mapping.cross_parameter;
        if let Some(ignore) = cross.ignore_annotations {
            options.ignore_cross_parameter(bean, signature.clone(), ignore);
        }
        executable.cross_parameter_constraints = reader.read_as(
            &cross.constraints,
            element,
            &label,
            ConstraintType::CrossParameter,
            LocationKind::CrossParameter(signature.clone()),
        )?;

        let ret = &mapping.return_value;
        if let Some(ignore) = ret.ignore_annotations {
            options.ignore_return_value(bean, signature.clone(), ignore);
        }
        executable.return_value_constraints = reader.read_as(
            &ret.constraints,
            element,
            &label,
            ConstraintType::Generic,
            LocationKind::ReturnValue(signature.clone()),
        )?;
        executable.return_element_constraints = reader.read(
            &ret.element_constraints,
            ElementKind::ContainerElement,
            &label,
            &|_| LocationKind::ContainerElement(Box::new(LocationKind::ReturnValue(signature.clone()))),
        )?;
        executable.return_cascading = CascadingConfig {
            cascading: ret.cascading,
            group_conversions: ret.group_conversions.clone(),
            unwrap: UnwrapMode::Automatic,
        };
        Ok(())
    }
}

/// Signature of a constructor of `owner` with the given parameter types.
pub(crate) fn constructor_signature<I, S>(owner: &TypeName, parameter_types: I) -> Signature
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Signature::new(owner.simple_name(), parameter_types)
}
