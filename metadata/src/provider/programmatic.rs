//! The fluent constraint mapping API and its provider.

use super::convert::{constructor_signature, MappingConverter};
use super::MetaDataProvider;
use crate::{
    AnnotationProcessingOptions, BeanConfiguration, ConfigurationSource, MetaDataError,
    MetaDataResult, SequenceProviders,
};
use beanval_core::{Annotation, TypeName};
use beanval_descriptor::ConstraintDefinitions;
use beanval_types::{Signature, TypeDef, TypeRegistry};
use std::collections::HashMap;
use tracing::debug;

/// Constraints declared in code.
///
/// ```ignore
/// let mut mapping = ConstraintMapping::new();
/// mapping
///     .type_("com.acme.Order")
///     .property("id", |p| p.constraint(builtin::not_null()))
///     .method(Signature::new("place", ["String"]), |m| {
///         m.parameter(0, |p| p.constraint(builtin::not_blank()))
///     });
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstraintMapping {
    types: Vec<TypeMapping>,
}

impl ConstraintMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapping of a type, created on first use.
    pub fn type_(&mut self, name: impl Into<TypeName>) -> &mut TypeMapping {
        let name = name.into();
        let index = match self.types.iter().position(|t| t.name == name) {
            Some(index) => index,
            None => {
                self.types.push(TypeMapping::new(name));
                self.types.len() - 1
            }
        };
        &mut self.types[index]
    }

    pub fn types(&self) -> &[TypeMapping] {
        &self.types
    }

    pub(crate) fn push(&mut self, mapping: TypeMapping) {
        self.types.push(mapping);
    }
}

/// Constraints of one type.
#[derive(Debug, Clone)]
pub struct TypeMapping {
    pub name: TypeName,
    pub constraints: Vec<Annotation>,
    pub properties: Vec<PropertyMapping>,
    pub methods: Vec<ExecutableMapping>,
    pub constructors: Vec<ExecutableMapping>,
    pub default_group_sequence: Option<Vec<TypeName>>,
    pub default_group_sequence_provider: Option<String>,
    pub ignore_annotations: Option<bool>,
    pub ignore_class_level: Option<bool>,
}

impl TypeMapping {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            default_group_sequence: None,
            default_group_sequence_provider: None,
            ignore_annotations: None,
            ignore_class_level: None,
        }
    }

    /// Add a class-level constraint.
    pub fn constraint(&mut self, annotation: Annotation) -> &mut Self {
        self.constraints.push(annotation);
        self
    }

    /// Ignore all annotation-declared constraints of the type.
    pub fn ignore_annotations(&mut self) -> &mut Self {
        self.ignore_annotations = Some(true);
        self
    }

    /// Ignore annotation-declared class-level constraints.
    pub fn ignore_class_level_annotations(&mut self) -> &mut Self {
        self.ignore_class_level = Some(true);
        self
    }

    pub fn default_group_sequence<I, T>(&mut self, groups: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        self.default_group_sequence = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// Use the sequence provider registered under `key`.
    pub fn default_group_sequence_provider(&mut self, key: impl Into<String>) -> &mut Self {
        self.default_group_sequence_provider = Some(key.into());
        self
    }

    pub fn property<F>(&mut self, name: impl Into<String>, configure: F) -> &mut Self
    where
        F: FnOnce(&mut PropertyMapping) -> &mut PropertyMapping,
    {
        let name = name.into();
        let index = match self.properties.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                self.properties.push(PropertyMapping::new(name));
                self.properties.len() - 1
            }
        };
        configure(&mut self.properties[index]);
        self
    }

    pub fn method<F>(&mut self, signature: Signature, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ExecutableMapping) -> &mut ExecutableMapping,
    {
        let index = executable_index(&mut self.methods, signature);
        configure(&mut self.methods[index]);
        self
    }

    pub fn constructor<I, S, F>(&mut self, parameter_types: I, configure: F) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(&mut ExecutableMapping) -> &mut ExecutableMapping,
    {
        let signature = constructor_signature(&self.name, parameter_types);
        let index = executable_index(&mut self.constructors, signature);
        configure(&mut self.constructors[index]);
        self
    }
}

fn executable_index(executables: &mut Vec<ExecutableMapping>, signature: Signature) -> usize {
    match executables.iter().position(|e| e.signature == signature) {
        Some(index) => index,
        None => {
            executables.push(ExecutableMapping::new(signature));
            executables.len() - 1
        }
    }
}

/// Constraints of a property.
#[derive(Debug, Clone)]
pub struct PropertyMapping {
    pub name: String,
    pub constraints: Vec<Annotation>,
    pub element_constraints: Vec<Annotation>,
    pub cascading: bool,
    pub group_conversions: Vec<(TypeName, TypeName)>,
    pub unwrap: Option<bool>,
    pub ignore_annotations: Option<bool>,
}

impl PropertyMapping {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
            element_constraints: Vec::new(),
            cascading: false,
            group_conversions: Vec::new(),
            unwrap: None,
            ignore_annotations: None,
        }
    }

    pub fn constraint(&mut self, annotation: Annotation) -> &mut Self {
        self.constraints.push(annotation);
        self
    }

    /// Add a constraint on the container's elements.
    pub fn element_constraint(&mut self, annotation: Annotation) -> &mut Self {
        self.element_constraints.push(annotation);
        self
    }

    /// Mark the property for cascaded validation.
    pub fn valid(&mut self) -> &mut Self {
        self.cascading = true;
        self
    }

    pub fn convert_group(&mut self, from: impl Into<TypeName>, to: impl Into<TypeName>) -> &mut Self {
        self.group_conversions.push((from.into(), to.into()));
        self
    }

    pub fn unwrap_validated_value(&mut self, unwrap: bool) -> &mut Self {
        self.unwrap = Some(unwrap);
        self
    }

    pub fn ignore_annotations(&mut self) -> &mut Self {
        self.ignore_annotations = Some(true);
        self
    }
}

/// Constraints of a method or constructor.
#[derive(Debug, Clone)]
pub struct ExecutableMapping {
    pub signature: Signature,
    pub parameters: Vec<ParameterMapping>,
    pub cross_parameter: CrossParameterMapping,
    pub return_value: ReturnValueMapping,
    pub ignore_annotations: Option<bool>,
}

impl ExecutableMapping {
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            parameters: Vec::new(),
            cross_parameter: CrossParameterMapping::default(),
            return_value: ReturnValueMapping::default(),
            ignore_annotations: None,
        }
    }

    pub fn parameter<F>(&mut self, index: usize, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ParameterMapping) -> &mut ParameterMapping,
    {
        let position = match self.parameters.iter().position(|p| p.index == index) {
            Some(position) => position,
            None => {
                self.parameters.push(ParameterMapping::new(index));
                self.parameters.len() - 1
            }
        };
        configure(&mut self.parameters[position]);
        self
    }

    pub fn cross_parameter<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut CrossParameterMapping) -> &mut CrossParameterMapping,
    {
        configure(&mut self.cross_parameter);
        self
    }

    pub fn return_value<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ReturnValueMapping) -> &mut ReturnValueMapping,
    {
        configure(&mut self.return_value);
        self
    }

    pub fn ignore_annotations(&mut self) -> &mut Self {
        self.ignore_annotations = Some(true);
        self
    }
}

/// Constraints of one parameter.
#[derive(Debug, Clone)]
pub struct ParameterMapping {
    pub index: usize,
    pub constraints: Vec<Annotation>,
    pub element_constraints: Vec<Annotation>,
    pub cascading: bool,
    pub group_conversions: Vec<(TypeName, TypeName)>,
    pub ignore_annotations: Option<bool>,
}

impl ParameterMapping {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            constraints: Vec::new(),
            element_constraints: Vec::new(),
            cascading: false,
            group_conversions: Vec::new(),
            ignore_annotations: None,
        }
    }

    pub fn constraint(&mut self, annotation: Annotation) -> &mut Self {
        self.constraints.push(annotation);
        self
    }

    pub fn element_constraint(&mut self, annotation: Annotation) -> &mut Self {
        self.element_constraints.push(annotation);
        self
    }

    pub fn valid(&mut self) -> &mut Self {
        self.cascading = true;
        self
    }

    pub fn convert_group(&mut self, from: impl Into<TypeName>, to: impl Into<TypeName>) -> &mut Self {
        self.group_conversions.push((from.into(), to.into()));
        self
    }

    pub fn ignore_annotations(&mut self) -> &mut Self {
        self.ignore_annotations = Some(true);
        self
    }
}

/// Cross-parameter constraints of an executable.
#[derive(Debug, Clone, Default)]
pub struct CrossParameterMapping {
    pub constraints: Vec<Annotation>,
    pub ignore_annotations: Option<bool>,
}

impl CrossParameterMapping {
    pub fn constraint(&mut self, annotation: Annotation) -> &mut Self {
        self.constraints.push(annotation);
        self
    }

    pub fn ignore_annotations(&mut self) -> &mut Self {
        self.ignore_annotations = Some(true);
        self
    }
}

/// Return-value constraints of an executable.
#[derive(Debug, Clone, Default)]
pub struct ReturnValueMapping {
    pub constraints: Vec<Annotation>,
    pub element_constraints: Vec<Annotation>,
    pub cascading: bool,
    pub group_conversions: Vec<(TypeName, TypeName)>,
    pub ignore_annotations: Option<bool>,
}

impl ReturnValueMapping {
    pub fn constraint(&mut self, annotation: Annotation) -> &mut Self {
        self.constraints.push(annotation);
        self
    }

    pub fn element_constraint(&mut self, annotation: Annotation) -> &mut Self {
        self.element_constraints.push(annotation);
        self
    }

    pub fn valid(&mut self) -> &mut Self {
        self.cascading = true;
        self
    }

    pub fn convert_group(&mut self, from: impl Into<TypeName>, to: impl Into<TypeName>) -> &mut Self {
        self.group_conversions.push((from.into(), to.into()));
        self
    }

    pub fn ignore_annotations(&mut self) -> &mut Self {
        self.ignore_annotations = Some(true);
        self
    }
}

/// Converted configurations of a set of mappings, keyed by type.
#[derive(Debug, Default)]
pub(crate) struct MappedConfigurations {
    pub configurations: HashMap<TypeName, BeanConfiguration>,
    pub options: AnnotationProcessingOptions,
}

impl MappedConfigurations {
    /// Convert all mappings. A type mapped by more than one mapping is an error.
    pub(crate) fn build(
        converter: &MappingConverter<'_>,
        mappings: &[ConstraintMapping],
    ) -> MetaDataResult<Self> {
        let mut result = Self::default();
        for mapping in mappings {
            for type_mapping in mapping.types() {
                let config = converter.convert(type_mapping, &mut result.options)?;
                if result.configurations.contains_key(&config.bean_type) {
                    return Err(MetaDataError::BeanMappedTwice {
                        type_name: config.bean_type.to_string(),
                    });
                }
                result.configurations.insert(config.bean_type.clone(), config);
            }
        }
        debug!(
            source = %converter.source,
            types = result.configurations.len(),
            "converted constraint mappings"
        );
        Ok(result)
    }
}

/// Provides the configurations declared through `ConstraintMapping`s.
#[derive(Debug)]
pub struct ProgrammaticMetaDataProvider {
    mapped: MappedConfigurations,
}

impl ProgrammaticMetaDataProvider {
    /// Convert the mappings eagerly; unknown types or members and types
    /// mapped twice are reported here.
    pub fn new(
        types: &TypeRegistry,
        definitions: &ConstraintDefinitions,
        sequence_providers: &SequenceProviders,
        mappings: &[ConstraintMapping],
    ) -> MetaDataResult<Self> {
        let converter = MappingConverter {
            types,
            definitions,
            sequence_providers,
            source: ConfigurationSource::Api,
        };
        Ok(Self {
            mapped: MappedConfigurations::build(&converter, mappings)?,
        })
    }

    /// Number of mapped types.
    pub fn len(&self) -> usize {
        self.mapped.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapped.configurations.is_empty()
    }
}

impl MetaDataProvider for ProgrammaticMetaDataProvider {
    fn source(&self) -> ConfigurationSource {
        ConfigurationSource::Api
    }

    fn bean_configuration(&self, type_def: &TypeDef) -> MetaDataResult<Option<BeanConfiguration>> {
        Ok(self.mapped.configurations.get(&type_def.name).cloned())
    }

    fn annotation_processing_options(&self) -> AnnotationProcessingOptions {
        self.mapped.options.clone()
    }
}
