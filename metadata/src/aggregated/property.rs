//! Aggregated property metadata and cascading declarations.

use crate::{CascadingConfig, MetaConstraint, MetaDataError, MetaDataResult, UnwrapMode};
use beanval_core::{names, TypeName};
use beanval_types::{TypeRegistry, ValueType};
use std::sync::Arc;

/// Merged cascading declaration of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadingMetaData {
    cascading: bool,
    group_conversions: Vec<(TypeName, TypeName)>,
    unwrap: UnwrapMode,
}

impl CascadingMetaData {
    /// Check the group conversions of a merged declaration.
    ///
    /// Conversions require cascading, a source group may be converted only
    /// once and a group sequence cannot be a source.
    pub(crate) fn build(
        types: &TypeRegistry,
        type_name: &TypeName,
        element: &str,
        config: &CascadingConfig,
    ) -> MetaDataResult<Self> {
        if !config.cascading && !config.group_conversions.is_empty() {
            return Err(MetaDataError::conversion_without_cascade(type_name.as_str(), element));
        }

        let mut group_conversions: Vec<(TypeName, TypeName)> = Vec::new();
        for (from, to) in &config.group_conversions {
            if group_conversions.iter().any(|(seen, _)| seen == from) {
                return Err(MetaDataError::DuplicateConversion {
                    type_name: type_name.to_string(),
                    element: element.to_string(),
                    from: from.to_string(),
                });
            }
            let is_sequence = types
                .get_type_by_name(from.as_str())
                .map(|def| def.is_interface() && def.annotation(names::GROUP_SEQUENCE).is_some())
                .unwrap_or(false);
            if is_sequence {
                return Err(MetaDataError::ConversionFromSequence {
                    type_name: type_name.to_string(),
                    element: element.to_string(),
                    from: from.to_string(),
                });
            }
            group_conversions.push((from.clone(), to.clone()));
        }

        Ok(Self {
            cascading: config.cascading,
            group_conversions,
            unwrap: config.unwrap,
        })
    }

    pub fn is_cascading(&self) -> bool {
        self.cascading
    }

    pub fn group_conversions(&self) -> &[(TypeName, TypeName)] {
        &self.group_conversions
    }

    pub fn has_group_conversions(&self) -> bool {
        !self.group_conversions.is_empty()
    }

    /// The group to cascade with when validating `group`.
    pub fn convert_group(&self, group: &TypeName) -> TypeName {
        self.group_conversions
            .iter()
            .find(|(from, _)| from == group)
            .map(|(_, to)| to.clone())
            .unwrap_or_else(|| group.clone())
    }

    pub fn unwrap_mode(&self) -> UnwrapMode {
        self.unwrap
    }
}

/// A property merged over the hierarchy and all providers.
#[derive(Debug)]
pub struct PropertyMetaData {
    name: String,
    value_type: ValueType,
    constraints: Vec<Arc<MetaConstraint>>,
    element_constraints: Vec<Arc<MetaConstraint>>,
    cascading: CascadingMetaData,
}

impl PropertyMetaData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Constraints on the property value.
    pub fn constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.constraints
    }

    /// Constraints on the elements of a container value.
    pub fn element_constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.element_constraints
    }

    /// Value and element constraints.
    pub fn all_constraints(&self) -> impl Iterator<Item = &Arc<MetaConstraint>> {
        self.constraints.iter().chain(self.element_constraints.iter())
    }

    pub fn cascading(&self) -> &CascadingMetaData {
        &self.cascading
    }

    pub fn is_cascading(&self) -> bool {
        self.cascading.is_cascading()
    }

    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty() || !self.element_constraints.is_empty() || self.is_cascading()
    }
}

/// Collects the declarations of one property.
#[derive(Debug)]
pub(crate) struct PropertyAccumulator {
    name: String,
    value_type: ValueType,
    constraints: Vec<MetaConstraint>,
    element_constraints: Vec<MetaConstraint>,
    cascading: CascadingConfig,
}

impl PropertyAccumulator {
    pub(crate) fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            constraints: Vec::new(),
            element_constraints: Vec::new(),
            cascading: CascadingConfig::default(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn add(
        &mut self,
        constraints: impl IntoIterator<Item = MetaConstraint>,
        element_constraints: impl IntoIterator<Item = MetaConstraint>,
        cascading: &CascadingConfig,
    ) {
        self.constraints.extend(constraints);
        self.element_constraints.extend(element_constraints);
        self.cascading.merge(cascading);
    }

    pub(crate) fn build(self, types: &TypeRegistry, bean: &TypeName) -> MetaDataResult<PropertyMetaData> {
        let cascading = CascadingMetaData::build(types, bean, &self.name, &self.cascading)?;
        Ok(PropertyMetaData {
            name: self.name,
            value_type: self.value_type,
            constraints: self.constraints.into_iter().map(Arc::new).collect(),
            element_constraints: self.element_constraints.into_iter().map(Arc::new).collect(),
            cascading,
        })
    }
}
