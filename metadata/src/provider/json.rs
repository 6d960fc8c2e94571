//! JSON mapping documents.
//!
//! ```json
//! {
//!   "default_package": "com.acme",
//!   "beans": [{
//!     "class": "Order",
//!     "class_level": { "group_sequence": ["Basic", "Order"] },
//!     "fields": [{ "name": "id", "constraints": [{ "annotation": "beanval.constraints.NotNull" }] }],
//!     "methods": [{
//!       "name": "place",
//!       "parameter_types": ["String"],
//!       "parameters": [{ "constraints": [{ "annotation": "beanval.constraints.NotBlank" }] }]
//!     }]
//!   }]
//! }
//! ```

use super::convert::{constructor_signature, MappingConverter};
use super::programmatic::{
    ConstraintMapping, ExecutableMapping, MappedConfigurations, ParameterMapping, TypeMapping,
};
use super::MetaDataProvider;
use crate::{
    AnnotationProcessingOptions, BeanConfiguration, ConfigurationSource, MetaDataError,
    MetaDataResult, SequenceProviders,
};
use beanval_core::{Annotation, AttributeValue, TypeName};
use beanval_descriptor::{ConstraintDefinitions, GROUPS, MESSAGE, PAYLOAD};
use beanval_types::{Signature, TypeDef, TypeRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingDocument {
    #[serde(default)]
    default_package: Option<String>,
    #[serde(default)]
    beans: Vec<BeanDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BeanDoc {
    class: String,
    #[serde(default)]
    ignore_annotations: Option<bool>,
    #[serde(default)]
    class_level: Option<ClassDoc>,
    #[serde(default)]
    fields: Vec<PropertyDoc>,
    #[serde(default)]
    getters: Vec<PropertyDoc>,
    #[serde(default)]
    methods: Vec<ExecutableDoc>,
    #[serde(default)]
    constructors: Vec<ExecutableDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassDoc {
    #[serde(default)]
    ignore_annotations: Option<bool>,
    #[serde(default)]
    constraints: Vec<ConstraintDoc>,
    #[serde(default)]
    group_sequence: Option<Vec<String>>,
    #[serde(default)]
    group_sequence_provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertyDoc {
    name: String,
    #[serde(default)]
    ignore_annotations: Option<bool>,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    convert_groups: Vec<ConversionDoc>,
    #[serde(default)]
    constraints: Vec<ConstraintDoc>,
    #[serde(default)]
    element_constraints: Vec<ConstraintDoc>,
    #[serde(default)]
    unwrap: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExecutableDoc {
    /// Method name; absent for constructors.
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parameter_types: Vec<String>,
    #[serde(default)]
    ignore_annotations: Option<bool>,
    /// Parameters in declaration order.
    #[serde(default)]
    parameters: Vec<ParameterDoc>,
    #[serde(default)]
    cross_parameter: Option<CrossParameterDoc>,
    #[serde(default)]
    return_value: Option<ReturnValueDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterDoc {
    #[serde(default)]
    ignore_annotations: Option<bool>,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    convert_groups: Vec<ConversionDoc>,
    #[serde(default)]
    constraints: Vec<ConstraintDoc>,
    #[serde(default)]
    element_constraints: Vec<ConstraintDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CrossParameterDoc {
    #[serde(default)]
    ignore_annotations: Option<bool>,
    #[serde(default)]
    constraints: Vec<ConstraintDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReturnValueDoc {
    #[serde(default)]
    ignore_annotations: Option<bool>,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    convert_groups: Vec<ConversionDoc>,
    #[serde(default)]
    constraints: Vec<ConstraintDoc>,
    #[serde(default)]
    element_constraints: Vec<ConstraintDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConversionDoc {
    from: String,
    to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstraintDoc {
    annotation: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    payload: Vec<String>,
    #[serde(default)]
    attributes: BTreeMap<String, serde_json::Value>,
}

/// Resolves the names used in one document.
struct DocumentReader {
    default_package: Option<String>,
}

impl DocumentReader {
    /// Names without a package are taken from the default package.
    fn qualify(&self, name: &str) -> TypeName {
        match &self.default_package {
            Some(package) if !name.contains('.') => TypeName::new(format!("{}.{}", package, name)),
            _ => TypeName::new(name),
        }
    }

    fn qualify_all(&self, names: &[String]) -> Vec<TypeName> {
        names.iter().map(|n| self.qualify(n)).collect()
    }

    fn conversions(&self, docs: &[ConversionDoc]) -> Vec<(TypeName, TypeName)> {
        docs.iter()
            .map(|c| (self.qualify(&c.from), self.qualify(&c.to)))
            .collect()
    }

    fn annotations(&self, docs: &[ConstraintDoc]) -> MetaDataResult<Vec<Annotation>> {
        docs.iter().map(|doc| self.annotation(doc)).collect()
    }

    fn annotation(&self, doc: &ConstraintDoc) -> MetaDataResult<Annotation> {
        let mut annotation = Annotation::new(self.qualify(&doc.annotation));
        for (key, value) in &doc.attributes {
            annotation = annotation.with(key.as_str(), attribute_value(&doc.annotation, key, value)?);
        }
        if let Some(message) = &doc.message {
            annotation = annotation.with(MESSAGE, message.as_str());
        }
        if !doc.groups.is_empty() {
            annotation = annotation.with(GROUPS, self.qualify_all(&doc.groups));
        }
        if !doc.payload.is_empty() {
            annotation = annotation.with(PAYLOAD, self.qualify_all(&doc.payload));
        }
        Ok(annotation)
    }

    fn type_mapping(&self, bean: &BeanDoc) -> MetaDataResult<TypeMapping> {
        let mut mapping = TypeMapping::new(self.qualify(&bean.class));
        mapping.ignore_annotations = bean.ignore_annotations;

        if let Some(class_level) = &bean.class_level {
            mapping.ignore_class_level = class_level.ignore_annotations;
            mapping.constraints = self.annotations(&class_level.constraints)?;
            mapping.default_group_sequence = class_level
                .group_sequence
                .as_ref()
                .map(|groups| self.qualify_all(groups));
            mapping.default_group_sequence_provider = class_level.group_sequence_provider.clone();
        }

        for doc in bean.fields.iter().chain(bean.getters.iter()) {
            let constraints = self.annotations(&doc.constraints)?;
            let element_constraints = self.annotations(&doc.element_constraints)?;
            let conversions = self.conversions(&doc.convert_groups);
            mapping.property(doc.name.as_str(), |p| {
                p.constraints.extend(constraints);
                p.element_constraints.extend(element_constraints);
                p.group_conversions.extend(conversions);
                p.cascading |= doc.valid;
                p.unwrap = doc.unwrap.or(p.unwrap);
                p.ignore_annotations = doc.ignore_annotations.or(p.ignore_annotations);
                p
            });
        }

        for doc in &bean.methods {
            let name = doc
                .name
                .as_deref()
                .ok_or_else(|| MetaDataError::invalid_mapping(format!("method without name on {}", bean.class)))?;
            let signature = Signature::new(name, doc.parameter_types.iter().cloned());
            mapping.methods.push(self.executable(signature, doc)?);
        }
        for doc in &bean.constructors {
            let signature = constructor_signature(&mapping.name, doc.parameter_types.iter().cloned());
            mapping.constructors.push(self.executable(signature, doc)?);
        }
        Ok(mapping)
    }

    fn executable(&self, signature: Signature, doc: &ExecutableDoc) -> MetaDataResult<ExecutableMapping> {
        let mut executable = ExecutableMapping::new(signature);
        executable.ignore_annotations = doc.ignore_annotations;

        for (index, parameter) in doc.parameters.iter().enumerate() {
            let mut mapping = ParameterMapping::new(index);
            mapping.ignore_annotations = parameter.ignore_annotations;
            mapping.cascading = parameter.valid;
            mapping.group_conversions = self.conversions(&parameter.convert_groups);
            mapping.constraints = self.annotations(&parameter.constraints)?;
            mapping.element_constraints = self.annotations(&parameter.element_constraints)?;
            executable.parameters.push(mapping);
        }

        if let Some(cross) = &doc.cross_parameter {
            executable.cross_parameter.ignore_annotations = cross.ignore_annotations;
            executable.cross_parameter.constraints = self.annotations(&cross.constraints)?;
        }

        if let Some(ret) = &doc.return_value {
            let target = &mut executable.return_value;
            target.ignore_annotations = ret.ignore_annotations;
            target.cascading = ret.valid;
            target.group_conversions = self.conversions(&ret.convert_groups);
            target.constraints = self.annotations(&ret.constraints)?;
            target.element_constraints = self.annotations(&ret.element_constraints)?;
        }
        Ok(executable)
    }
}

fn attribute_value(constraint: &str, key: &str, value: &serde_json::Value) -> MetaDataResult<AttributeValue> {
    use serde_json::Value as Json;
    let invalid = || {
        MetaDataError::invalid_mapping(format!(
            "unsupported value {} for attribute '{}' of {}",
            value, key, constraint
        ))
    };
    match value {
        Json::Bool(b) => Ok(AttributeValue::Bool(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(AttributeValue::Int(i)),
            None => n.as_f64().map(AttributeValue::Float).ok_or_else(invalid),
        },
        Json::String(s) => Ok(AttributeValue::String(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<MetaDataResult<Vec<String>>>()
            .map(AttributeValue::Strings),
        Json::Null | Json::Object(_) => Err(invalid()),
    }
}

/// Provides the configurations declared in JSON mapping documents.
#[derive(Debug)]
pub struct MappingMetaDataProvider {
    mapped: MappedConfigurations,
}

impl MappingMetaDataProvider {
    /// Parse and convert the documents eagerly. A bean mapped more than
    /// once, across or within documents, is an error.
    pub fn from_json<S: AsRef<str>>(
        types: &TypeRegistry,
        definitions: &ConstraintDefinitions,
        sequence_providers: &SequenceProviders,
        documents: &[S],
    ) -> MetaDataResult<Self> {
        let mut mappings = Vec::with_capacity(documents.len());
        for document in documents {
            let parsed: MappingDocument = serde_json::from_str(document.as_ref())?;
            let reader = DocumentReader {
                default_package: parsed.default_package.clone(),
            };
            let mut mapping = ConstraintMapping::new();
            for bean in &parsed.beans {
                mapping.push(reader.type_mapping(bean)?);
            }
            mappings.push(mapping);
        }

        let converter = MappingConverter {
            types,
            definitions,
            sequence_providers,
            source: ConfigurationSource::Mapping,
        };
        Ok(Self {
            mapped: MappedConfigurations::build(&converter, &mappings)?,
        })
    }

    pub fn len(&self) -> usize {
        self.mapped.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapped.configurations.is_empty()
    }
}

impl MetaDataProvider for MappingMetaDataProvider {
    fn source(&self) -> ConfigurationSource {
        ConfigurationSource::Mapping
    }

    fn bean_configuration(&self, type_def: &TypeDef) -> MetaDataResult<Option<BeanConfiguration>> {
        Ok(self.mapped.configurations.get(&type_def.name).cloned())
    }

    fn annotation_processing_options(&self) -> AnnotationProcessingOptions {
        self.mapped.options.clone()
    }
}
