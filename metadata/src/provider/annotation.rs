//! Metadata declared through annotations of the type model.

use super::convert::{constructor_element, method_element, read_cascading, ConstraintReader};
use super::MetaDataProvider;
use crate::{
    BeanConfiguration, ConfigurationSource, ConstrainedElement, ConstrainedExecutable,
    ConstrainedParameter, ConstrainedProperty, ConstrainedType, LocationKind, MetaDataError,
    MetaDataResult, SequenceProviders,
};
use beanval_core::{names, AttributeValue};
use beanval_descriptor::{ConstraintDefinitions, ConstraintType, ElementKind};
use beanval_types::{ExecutableKind, ParameterDef, Signature, TypeDef, TypeRegistry, ValueType};
use std::sync::Arc;
use tracing::trace;

/// Reads constraints, cascading declarations and default group sequences
/// from annotations. Annotations that are not constraints are skipped.
#[derive(Debug, Clone)]
pub struct AnnotationMetaDataProvider {
    types: Arc<TypeRegistry>,
    definitions: Arc<ConstraintDefinitions>,
    sequence_providers: Arc<SequenceProviders>,
}

impl AnnotationMetaDataProvider {
    pub fn new(
        types: Arc<TypeRegistry>,
        definitions: Arc<ConstraintDefinitions>,
        sequence_providers: Arc<SequenceProviders>,
    ) -> Self {
        Self {
            types,
            definitions,
            sequence_providers,
        }
    }

    fn read_class_level(&self, type_def: &TypeDef, config: &mut BeanConfiguration) -> MetaDataResult<()> {
        let bean = &type_def.name;

        // On interfaces these annotations define group sequences, not default sequences
        if type_def.is_interface() {
            return Ok(());
        }

        if let Some(sequence) = type_def.annotation(names::GROUP_SEQUENCE) {
            let groups = sequence
                .attribute("value")
                .and_then(AttributeValue::as_types)
                .map(<[_]>::to_vec)
                .unwrap_or_default();
            config.default_group_sequence = Some(groups);
        }

        if let Some(annotation) = type_def.annotation(names::GROUP_SEQUENCE_PROVIDER) {
            let key = annotation
                .attribute("value")
                .and_then(AttributeValue::as_str)
                .unwrap_or_default();
            let provider = self.sequence_providers.get(key).ok_or_else(|| {
                MetaDataError::UnknownSequenceProvider {
                    type_name: bean.to_string(),
                    key: key.to_string(),
                }
            })?;
            config.default_group_sequence_provider = Some(provider);
        }
        Ok(())
    }

    fn read_parameters(
        &self,
        reader: &ConstraintReader<'_>,
        signature: &Signature,
        parameters: &[ParameterDef],
        executable: &mut ConstrainedExecutable,
    ) -> MetaDataResult<()> {
        for (index, def) in parameters.iter().enumerate() {
            let location = LocationKind::Parameter {
                signature: signature.clone(),
                index,
            };
            let mut parameter = ConstrainedParameter::new(index, &def.name, def.value_type.clone());
            parameter.constraints =
                reader.read(&def.annotations, ElementKind::Parameter, &def.name, &|_| location.clone())?;
            parameter.element_constraints = reader.read(
                &def.element_annotations,
                ElementKind::ContainerElement,
                &def.name,
                &|_| LocationKind::ContainerElement(Box::new(location.clone())),
            )?;
            parameter.cascading = read_cascading(&def.annotations);
            executable.parameters.push(parameter);
        }
        Ok(())
    }

    /// Split executable annotations into cross-parameter and return-value
    /// constraints by the type of each constraint.
    fn read_executable_annotations(
        &self,
        reader: &ConstraintReader<'_>,
        annotations: &[beanval_core::Annotation],
        element: ElementKind,
        executable: &mut ConstrainedExecutable,
    ) -> MetaDataResult<()> {
        let signature = executable.signature.clone();
        let label = signature.to_string();
        let constraints = reader.read(annotations, element, &label, &|constraint_type| {
            match constraint_type {
                ConstraintType::CrossParameter => LocationKind::CrossParameter(signature.clone()),
                ConstraintType::Generic => LocationKind::ReturnValue(signature.clone()),
            }
        })?;
        for constraint in constraints {
            match constraint.location().kind {
                LocationKind::CrossParameter(_) => executable.cross_parameter_constraints.push(constraint),
                _ => executable.return_value_constraints.push(constraint),
            }
        }
        executable.return_cascading = read_cascading(annotations);
        Ok(())
    }
}

impl MetaDataProvider for AnnotationMetaDataProvider {
    fn source(&self) -> ConfigurationSource {
        ConfigurationSource::Annotation
    }

    fn bean_configuration(&self, type_def: &TypeDef) -> MetaDataResult<Option<BeanConfiguration>> {
        let bean = &type_def.name;
        let reader = ConstraintReader::new(&self.definitions, &self.types, bean, false);
        let mut config = BeanConfiguration::new(ConfigurationSource::Annotation, bean);

        let class_constraints =
            reader.read(&type_def.annotations, ElementKind::Type, "<class>", &|_| LocationKind::Bean)?;
        config
            .elements
            .push(ConstrainedElement::Type(ConstrainedType {
                constraints: class_constraints,
            }));
        self.read_class_level(type_def, &mut config)?;

        for def in &type_def.properties {
            let location = LocationKind::Property(def.name.clone());
            let mut property = ConstrainedProperty::new(&def.name, def.value_type.clone());
            property.constraints =
                reader.read(&def.annotations, ElementKind::Property, &def.name, &|_| location.clone())?;
            property.element_constraints = reader.read(
                &def.element_annotations,
                ElementKind::ContainerElement,
                &def.name,
                &|_| LocationKind::ContainerElement(Box::new(location.clone())),
            )?;
            property.cascading = read_cascading(&def.annotations);
            config.elements.push(ConstrainedElement::Property(property));
        }

        for def in &type_def.methods {
            let signature = def.signature();
            let mut executable =
                ConstrainedExecutable::new(ExecutableKind::Method, signature.clone(), def.return_type.clone());
            executable.is_private = def.is_private();
            self.read_parameters(&reader, &signature, &def.parameters, &mut executable)?;
            let element = method_element(&def.parameters, def.return_type.as_ref());
            self.read_executable_annotations(&reader, &def.annotations, element, &mut executable)?;
            executable.return_element_constraints = reader.read(
                &def.return_element_annotations,
                ElementKind::ContainerElement,
                &signature.to_string(),
                &|_| LocationKind::ContainerElement(Box::new(LocationKind::ReturnValue(signature.clone()))),
            )?;
            config.elements.push(ConstrainedElement::Executable(executable));
        }

        for def in &type_def.constructors {
            let signature = def.signature(bean);
            let mut executable = ConstrainedExecutable::new(
                ExecutableKind::Constructor,
                signature.clone(),
                Some(ValueType::Named(bean.clone())),
            );
            self.read_parameters(&reader, &signature, &def.parameters, &mut executable)?;
            let element = constructor_element(&def.parameters);
            self.read_executable_annotations(&reader, &def.annotations, element, &mut executable)?;
            config.elements.push(ConstrainedElement::Executable(executable));
        }

        trace!(bean = %bean, elements = config.elements.len(), "read annotation metadata");
        Ok(Some(config))
    }
}
