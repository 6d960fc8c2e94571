//! Aggregated method and constructor metadata.

use super::property::CascadingMetaData;
use super::rules::Declaration;
use crate::{CascadingConfig, MetaConstraint, MetaDataResult};
use beanval_core::TypeName;
use beanval_types::{ExecutableKind, ParameterDef, Signature, TypeRegistry, ValueType};
use std::sync::Arc;

/// One parameter of an executable.
#[derive(Debug)]
pub struct ParameterMetaData {
    index: usize,
    name: String,
    value_type: ValueType,
    constraints: Vec<Arc<MetaConstraint>>,
    element_constraints: Vec<Arc<MetaConstraint>>,
    cascading: CascadingMetaData,
}

impl ParameterMetaData {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.constraints
    }

    pub fn element_constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.element_constraints
    }

    pub fn cascading(&self) -> &CascadingMetaData {
        &self.cascading
    }

    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty() || !self.element_constraints.is_empty() || self.cascading.is_cascading()
    }
}

/// A method or constructor merged over all declaring types.
///
/// Return-value and cross-parameter constraints accumulate over the
/// hierarchy. Parameter constraints come from the top-level declaration,
/// since overriding declarations must not add any.
#[derive(Debug)]
pub struct ExecutableMetaData {
    kind: ExecutableKind,
    signature: Signature,
    declaring_types: Vec<TypeName>,
    parameters: Vec<ParameterMetaData>,
    cross_parameter_constraints: Vec<Arc<MetaConstraint>>,
    return_value_constraints: Vec<Arc<MetaConstraint>>,
    return_element_constraints: Vec<Arc<MetaConstraint>>,
    return_cascading: CascadingMetaData,
    return_type: Option<ValueType>,
}

impl ExecutableMetaData {
    /// Merge the declarations of one signature. `parameters` are the
    /// declared parameters of the most specific declaration.
    pub(crate) fn build(
        types: &TypeRegistry,
        bean: &TypeName,
        kind: ExecutableKind,
        signature: &Signature,
        parameters: &[ParameterDef],
        declarations: Vec<Declaration>,
    ) -> MetaDataResult<Self> {
        let mut accumulated: Vec<(Vec<MetaConstraint>, Vec<MetaConstraint>, CascadingConfig)> =
            parameters.iter().map(|_| Default::default()).collect();
        let mut cross_parameter_constraints = Vec::new();
        let mut return_value_constraints = Vec::new();
        let mut return_element_constraints = Vec::new();
        let mut return_cascading = CascadingConfig::default();
        let mut declaring_types = Vec::with_capacity(declarations.len());
        let mut return_type = None;

        for declaration in declarations {
            declaring_types.push(declaration.type_name);
            let executable = declaration.executable;
            if return_type.is_none() {
                return_type = executable.return_type;
            }
            for parameter in executable.parameters {
                if let Some((constraints, element_constraints, cascading)) =
                    accumulated.get_mut(parameter.index)
                {
                    constraints.extend(parameter.constraints);
                    element_constraints.extend(parameter.element_constraints);
                    cascading.merge(&parameter.cascading);
                }
            }
            cross_parameter_constraints.extend(executable.cross_parameter_constraints);
            return_value_constraints.extend(executable.return_value_constraints);
            return_element_constraints.extend(executable.return_element_constraints);
            return_cascading.merge(&executable.return_cascading);
        }

        let mut parameter_meta = Vec::with_capacity(parameters.len());
        for (index, (def, (constraints, element_constraints, cascading))) in
            parameters.iter().zip(accumulated).enumerate()
        {
            let element = format!("{}#{}", signature, def.name);
            parameter_meta.push(ParameterMetaData {
                index,
                name: def.name.clone(),
                value_type: def.value_type.clone(),
                constraints: into_shared(constraints),
                element_constraints: into_shared(element_constraints),
                cascading: CascadingMetaData::build(types, bean, &element, &cascading)?,
            });
        }

        let return_element = format!("{}#<return value>", signature);
        Ok(Self {
            kind,
            signature: signature.clone(),
            declaring_types,
            parameters: parameter_meta,
            cross_parameter_constraints: into_shared(cross_parameter_constraints),
            return_value_constraints: into_shared(return_value_constraints),
            return_element_constraints: into_shared(return_element_constraints),
            return_cascading: CascadingMetaData::build(types, bean, &return_element, &return_cascading)?,
            return_type,
        })
    }

    pub fn kind(&self) -> ExecutableKind {
        self.kind
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Types declaring the executable, in hierarchy order.
    pub fn declaring_types(&self) -> &[TypeName] {
        &self.declaring_types
    }

    pub fn parameters(&self) -> &[ParameterMetaData] {
        &self.parameters
    }

    pub fn parameter(&self, index: usize) -> Option<&ParameterMetaData> {
        self.parameters.get(index)
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(ParameterMetaData::name).collect()
    }

    pub fn cross_parameter_constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.cross_parameter_constraints
    }

    pub fn return_value_constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.return_value_constraints
    }

    pub fn return_element_constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.return_element_constraints
    }

    pub fn return_cascading(&self) -> &CascadingMetaData {
        &self.return_cascading
    }

    pub fn return_type(&self) -> Option<&ValueType> {
        self.return_type.as_ref()
    }

    pub fn has_return_value(&self) -> bool {
        self.return_type.is_some()
    }

    pub fn has_parameter_constraints(&self) -> bool {
        !self.cross_parameter_constraints.is_empty()
            || self.parameters.iter().any(ParameterMetaData::is_constrained)
    }

    pub fn is_return_value_constrained(&self) -> bool {
        !self.return_value_constraints.is_empty()
            || !self.return_element_constraints.is_empty()
            || self.return_cascading.is_cascading()
    }

    /// Returns true if anything about the executable needs validation.
    pub fn is_constrained(&self) -> bool {
        self.has_parameter_constraints() || self.is_return_value_constrained()
    }
}

fn into_shared(constraints: Vec<MetaConstraint>) -> Vec<Arc<MetaConstraint>> {
    constraints.into_iter().map(Arc::new).collect()
}
