//! The aggregated metadata of one bean type.

use super::executable::ExecutableMetaData;
use super::property::{PropertyAccumulator, PropertyMetaData};
use super::rules::{self, Declaration, MethodValidationConfig};
use crate::{
    BeanConfiguration, ConstrainedElement, ConstrainedExecutable, LocationKind, MetaConstraint,
    MetaDataError, MetaDataResult, SequenceProviderRef,
};
use beanval_core::{BeanRef, TypeName};
use beanval_types::{ExecutableKind, Signature, TypeDef, TypeId, TypeRegistry, ValueType};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Everything known about the constraints of one bean type, merged over
/// its hierarchy and all providers. Immutable once built.
#[derive(Debug)]
pub struct BeanMetaData {
    bean_type: TypeName,
    type_id: TypeId,
    hierarchy: Vec<TypeName>,
    class_hierarchy: Vec<TypeName>,
    class_constraints: Vec<Arc<MetaConstraint>>,
    properties: Vec<Arc<PropertyMetaData>>,
    property_index: HashMap<String, usize>,
    meta_constraints: Vec<Arc<MetaConstraint>>,
    direct_meta_constraints: Vec<Arc<MetaConstraint>>,
    methods: HashMap<Signature, Arc<ExecutableMetaData>>,
    constructors: HashMap<Signature, Arc<ExecutableMetaData>>,
    default_group_sequence: Vec<TypeName>,
    sequence_provider: Option<SequenceProviderRef>,
    has_constraints: bool,
}

impl BeanMetaData {
    /// Aggregate the configurations of a bean's hierarchy. Configurations
    /// come in hierarchy order, and in provider order within one type.
    pub(crate) fn build(
        types: &TypeRegistry,
        type_id: TypeId,
        configurations: Vec<BeanConfiguration>,
        method_config: &MethodValidationConfig,
    ) -> MetaDataResult<Self> {
        let bean_def = types
            .get_type(type_id)
            .ok_or_else(|| MetaDataError::unknown_type(type_id.to_string()))?;
        let bean = bean_def.name.clone();

        let names = |ids: Vec<TypeId>| -> Vec<TypeName> {
            ids.into_iter()
                .filter_map(|id| types.get_type(id))
                .map(|t| t.name.clone())
                .collect()
        };
        let hierarchy = names(types.hierarchy(type_id));
        let class_hierarchy = names(types.class_hierarchy(type_id));
        let mut direct_types: HashSet<TypeName> =
            names(types.directly_implemented_interfaces(type_id)).into_iter().collect();
        direct_types.insert(bean.clone());

        let (default_group_sequence, sequence_provider) = resolve_default_sequence(bean_def, &configurations)?;

        let mut class_constraints = Vec::new();
        let mut properties: Vec<PropertyAccumulator> = Vec::new();
        let mut methods: BTreeMap<Signature, Vec<Declaration>> = BTreeMap::new();
        let mut constructors: BTreeMap<Signature, Vec<Declaration>> = BTreeMap::new();

        for config in configurations {
            let declaring_id = types
                .type_id(&config.bean_type)
                .ok_or_else(|| MetaDataError::unknown_type(config.bean_type.as_str()))?;
            let declaring_def = types
                .get_type(declaring_id)
                .ok_or_else(|| MetaDataError::unknown_type(config.bean_type.as_str()))?;
            let on_bean = declaring_id == type_id;

            for element in config.elements {
                match element {
                    ConstrainedElement::Type(t) => class_constraints.extend(t.constraints),
                    ConstrainedElement::Property(p) => {
                        property_entry(&mut properties, &p.name, &p.value_type).add(
                            p.constraints,
                            p.element_constraints,
                            &p.cascading,
                        );
                    }
                    ConstrainedElement::Executable(e) if e.kind == ExecutableKind::Constructor => {
                        if on_bean {
                            add_declaration(&mut constructors, declaring_id, declaring_def, e);
                        }
                    }
                    ConstrainedElement::Executable(e) => {
                        relocate_getter(&mut properties, declaring_def, &e);
                        if e.is_private && !on_bean {
                            continue;
                        }
                        add_declaration(&mut methods, declaring_id, declaring_def, e);
                    }
                }
            }
        }

        let class_constraints: Vec<Arc<MetaConstraint>> = class_constraints.into_iter().map(Arc::new).collect();
        let properties = properties
            .into_iter()
            .map(|p| p.build(types, &bean).map(Arc::new))
            .collect::<MetaDataResult<Vec<_>>>()?;
        let property_index = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name().to_string(), i))
            .collect();

        let meta_constraints: Vec<Arc<MetaConstraint>> = class_constraints
            .iter()
            .chain(properties.iter().flat_map(|p| p.all_constraints()))
            .cloned()
            .collect();
        let direct_meta_constraints = meta_constraints
            .iter()
            .filter(|c| direct_types.contains(c.declaring_type()))
            .cloned()
            .collect();

        let methods = build_executables(types, &bean, ExecutableKind::Method, methods, Some(method_config))?;
        let constructors = build_executables(types, &bean, ExecutableKind::Constructor, constructors, None)?;

        let has_constraints = !class_constraints.is_empty()
            || properties.iter().any(|p| p.is_constrained())
            || methods.values().any(|m| m.is_constrained())
            || constructors.values().any(|c| c.is_constrained());

        Ok(Self {
            bean_type: bean,
            type_id,
            hierarchy,
            class_hierarchy,
            class_constraints,
            properties,
            property_index,
            meta_constraints,
            direct_meta_constraints,
            methods,
            constructors,
            default_group_sequence,
            sequence_provider,
            has_constraints,
        })
    }

    pub fn bean_type(&self) -> &TypeName {
        &self.bean_type
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The bean type, its superclasses and then all its interfaces.
    pub fn hierarchy(&self) -> &[TypeName] {
        &self.hierarchy
    }

    /// The bean type and its superclasses, leaf-to-root.
    pub fn class_hierarchy(&self) -> &[TypeName] {
        &self.class_hierarchy
    }

    pub fn class_constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.class_constraints
    }

    pub fn properties(&self) -> &[Arc<PropertyMetaData>] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Arc<PropertyMetaData>> {
        self.property_index.get(name).map(|&i| &self.properties[i])
    }

    /// All class-level, property and container-element constraints of
    /// the hierarchy.
    pub fn meta_constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.meta_constraints
    }

    /// Constraints declared on the bean type or on an interface it
    /// implements itself.
    pub fn direct_meta_constraints(&self) -> &[Arc<MetaConstraint>] {
        &self.direct_meta_constraints
    }

    /// Properties marked for cascaded validation.
    pub fn cascadables(&self) -> impl Iterator<Item = &Arc<PropertyMetaData>> {
        self.properties.iter().filter(|p| p.is_cascading())
    }

    pub fn executable(&self, signature: &Signature) -> Option<&Arc<ExecutableMetaData>> {
        self.methods.get(signature)
    }

    pub fn executables(&self) -> impl Iterator<Item = &Arc<ExecutableMetaData>> {
        self.methods.values()
    }

    pub fn constructor(&self, signature: &Signature) -> Option<&Arc<ExecutableMetaData>> {
        self.constructors.get(signature)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &Arc<ExecutableMetaData>> {
        self.constructors.values()
    }

    /// The default group sequence for a bean instance, with the bean type
    /// replaced by `Default`. A sequence provider is invoked on each call.
    pub fn default_group_sequence(&self, bean: Option<&BeanRef>) -> MetaDataResult<Vec<TypeName>> {
        match &self.sequence_provider {
            Some(provider) => {
                let groups = provider.validation_groups(bean).map_err(|e| {
                    MetaDataError::SequenceProviderFailed {
                        type_name: self.bean_type.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                valid_default_group_sequence(&self.bean_type, &groups)
            }
            None => Ok(self.default_group_sequence.clone()),
        }
    }

    pub fn has_default_group_sequence_provider(&self) -> bool {
        self.sequence_provider.is_some()
    }

    pub fn is_default_group_sequence_redefined(&self) -> bool {
        self.default_group_sequence.len() > 1 || self.sequence_provider.is_some()
    }

    /// Returns true if any element of the hierarchy is constrained or
    /// marked for cascaded validation.
    pub fn has_constraints(&self) -> bool {
        self.has_constraints
    }
}

fn property_entry<'a>(
    properties: &'a mut Vec<PropertyAccumulator>,
    name: &str,
    value_type: &ValueType,
) -> &'a mut PropertyAccumulator {
    let index = match properties.iter().position(|p| p.name() == name) {
        Some(index) => index,
        None => {
            properties.push(PropertyAccumulator::new(name, value_type.clone()));
            properties.len() - 1
        }
    };
    &mut properties[index]
}

/// Getter return-value constraints are also constraints of the property.
fn relocate_getter(properties: &mut Vec<PropertyAccumulator>, declaring: &TypeDef, executable: &ConstrainedExecutable) {
    if !executable.is_return_value_constrained() {
        return;
    }
    let Some(method) = declaring.method(&executable.signature) else {
        return;
    };
    let (Some(name), Some(value_type)) = (method.getter_property_name(), executable.return_type.as_ref()) else {
        return;
    };

    let kind = LocationKind::Property(name.clone());
    let element_kind = LocationKind::ContainerElement(Box::new(kind.clone()));
    let constraints: Vec<MetaConstraint> = executable
        .return_value_constraints
        .iter()
        .map(|c| c.relocate(kind.clone()))
        .collect();
    let element_constraints: Vec<MetaConstraint> = executable
        .return_element_constraints
        .iter()
        .map(|c| c.relocate(element_kind.clone()))
        .collect();
    property_entry(properties, &name, value_type).add(constraints, element_constraints, &executable.return_cascading);
}

fn add_declaration(
    declarations: &mut BTreeMap<Signature, Vec<Declaration>>,
    type_id: TypeId,
    declaring: &TypeDef,
    executable: ConstrainedExecutable,
) {
    let entries = declarations.entry(executable.signature.clone()).or_default();
    match entries.iter_mut().find(|d| d.type_id == type_id) {
        Some(existing) => existing.executable.merge(executable),
        None => entries.push(Declaration {
            type_id,
            type_name: declaring.name.clone(),
            executable,
        }),
    }
}

fn build_executables(
    types: &TypeRegistry,
    bean: &TypeName,
    kind: ExecutableKind,
    declarations: BTreeMap<Signature, Vec<Declaration>>,
    method_config: Option<&MethodValidationConfig>,
) -> MetaDataResult<HashMap<Signature, Arc<ExecutableMetaData>>> {
    let mut result = HashMap::with_capacity(declarations.len());
    for (signature, declarations) in declarations {
        if let Some(config) = method_config {
            rules::check_declarations(types, config, &declarations)?;
        }
        let parameters = declarations
            .first()
            .and_then(|d| types.get_type(d.type_id))
            .and_then(|t| match kind {
                ExecutableKind::Method => t.method(&signature).map(|m| m.parameters.clone()),
                ExecutableKind::Constructor => t.constructor(&signature).map(|c| c.parameters.clone()),
            })
            .unwrap_or_default();
        let meta = ExecutableMetaData::build(types, bean, kind, &signature, &parameters, declarations)?;
        result.insert(signature, Arc::new(meta));
    }
    Ok(result)
}

/// Exactly one default sequence source per type, read from the type's own
/// configurations only.
fn resolve_default_sequence(
    bean_def: &TypeDef,
    configurations: &[BeanConfiguration],
) -> MetaDataResult<(Vec<TypeName>, Option<SequenceProviderRef>)> {
    let bean = &bean_def.name;
    let own: Vec<&BeanConfiguration> = configurations.iter().filter(|c| &c.bean_type == bean).collect();
    let sequences: Vec<&Vec<TypeName>> = own.iter().filter_map(|c| c.default_group_sequence.as_ref()).collect();
    let providers: Vec<&SequenceProviderRef> =
        own.iter().filter_map(|c| c.default_group_sequence_provider.as_ref()).collect();

    if sequences.len() > 1 || providers.len() > 1 {
        return Err(MetaDataError::MultipleDefaultSequences {
            type_name: bean.to_string(),
        });
    }
    match (sequences.first(), providers.first()) {
        (Some(_), Some(_)) => Err(MetaDataError::SequenceAndProvider {
            type_name: bean.to_string(),
        }),
        (None, Some(provider)) => Ok((vec![TypeName::default_group()], Some((*provider).clone()))),
        (Some(sequence), None) => Ok((valid_default_group_sequence(bean, sequence)?, None)),
        (None, None) => Ok((vec![TypeName::default_group()], None)),
    }
}

/// Replace the bean type by `Default`. `Default` itself must not be
/// listed and the bean type must be.
fn valid_default_group_sequence(bean: &TypeName, groups: &[TypeName]) -> MetaDataResult<Vec<TypeName>> {
    if groups.is_empty() {
        return Ok(vec![TypeName::default_group()]);
    }
    let mut result = Vec::with_capacity(groups.len());
    let mut contains_bean = false;
    for group in groups {
        if group == bean {
            result.push(TypeName::default_group());
            contains_bean = true;
        } else if group.is_default_group() {
            return Err(MetaDataError::DefaultInSequence {
                type_name: bean.to_string(),
            });
        } else {
            result.push(group.clone());
        }
    }
    if !contains_bean {
        return Err(MetaDataError::BeanClassNotInSequence {
            type_name: bean.to_string(),
        });
    }
    Ok(result)
}
