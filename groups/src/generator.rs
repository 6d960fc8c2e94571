//! Validation order generation.

use crate::{Group, GroupError, GroupResult, GroupWithInheritance, Sequence, ValidationOrder};
use beanval_core::{names, TypeName};
use beanval_types::TypeRegistry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Computes validation orders from requested groups.
///
/// Resolved group sequences are cached; a sequence computed concurrently by
/// two callers is published once and the first stored instance wins.
#[derive(Debug)]
pub struct ValidationOrderGenerator {
    types: Arc<TypeRegistry>,
    resolved: RwLock<HashMap<TypeName, Arc<Sequence>>>,
}

impl ValidationOrderGenerator {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            types,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// The order for a single group. Unless `expand` is set the group is
    /// taken as is, even if it is a sequence or inherits other groups.
    pub fn validation_order_for(&self, group: &TypeName, expand: bool) -> GroupResult<ValidationOrder> {
        if group.is_default_group() {
            return Ok(ValidationOrder::default_group());
        }
        if expand {
            return self.validation_order(std::slice::from_ref(group));
        }
        let mut order = ValidationOrder::new();
        order.insert_group(Group::new(group));
        Ok(order)
    }

    /// The order for the groups requested at a validation call.
    pub fn validation_order(&self, groups: &[TypeName]) -> GroupResult<ValidationOrder> {
        if groups.is_empty() {
            return Err(GroupError::EmptyGroups);
        }
        if groups.len() == 1 && groups[0].is_default_group() {
            return Ok(ValidationOrder::default_group());
        }

        for group in groups {
            let type_def = self
                .types
                .get_type_by_name(group.as_str())
                .ok_or_else(|| GroupError::UnknownGroup(group.to_string()))?;
            if !type_def.is_interface() {
                return Err(GroupError::GroupNotInterface(group.to_string()));
            }
        }

        let mut order = ValidationOrder::new();
        for group in groups {
            if group.is_default_group() {
                order.insert_group(Group::default_group());
            } else if let Some(elements) = self.sequence_elements(group) {
                let sequence = self.cached_sequence(group, &elements)?;
                order.insert_sequence(sequence);
            } else {
                order.insert_group(Group::new(group));
                for inherited in self.inherited_groups(group) {
                    order.insert_group(inherited);
                }
            }
        }
        trace!(
            groups = order.groups().len(),
            sequences = order.sequences().len(),
            "computed validation order"
        );
        Ok(order)
    }

    /// The order for a bean's redefined default group sequence. `Default`
    /// in the sequence stands for the bean type's own constraints.
    pub fn default_validation_order(
        &self,
        bean_type: &TypeName,
        default_sequence: &[TypeName],
    ) -> GroupResult<ValidationOrder> {
        let sequence = self.build_sequence(bean_type, default_sequence)?;
        let mut order = ValidationOrder::new();
        order.insert_sequence(Arc::new(sequence));
        Ok(order)
    }

    /// Number of cached sequences.
    pub fn cached_sequences(&self) -> usize {
        self.resolved.read().len()
    }

    /// Drop all cached sequences.
    pub fn clear(&self) {
        self.resolved.write().clear();
    }

    fn cached_sequence(&self, name: &TypeName, elements: &[TypeName]) -> GroupResult<Arc<Sequence>> {
        if let Some(sequence) = self.resolved.read().get(name) {
            trace!(sequence = %name, "sequence cache hit");
            return Ok(Arc::clone(sequence));
        }

        let sequence = Arc::new(self.build_sequence(name, elements)?);
        let mut resolved = self.resolved.write();
        Ok(Arc::clone(resolved.entry(name.clone()).or_insert(sequence)))
    }

    fn build_sequence(&self, name: &TypeName, elements: &[TypeName]) -> GroupResult<Sequence> {
        let mut visiting = Vec::new();
        let mut sequence = self.resolve_sequence(name, elements, &mut visiting)?;
        // Inherited groups are added only after the sequence proved expandable.
        let expanded = sequence
            .composing_groups()
            .iter()
            .map(|group| {
                let mut groups = vec![group.clone()];
                for inherited in self.inherited_groups(group.defining_type()) {
                    if !groups.contains(&inherited) {
                        groups.push(inherited);
                    }
                }
                GroupWithInheritance::new(groups)
            })
            .collect();
        sequence.set_expanded(expanded);
        Ok(sequence)
    }

    fn resolve_sequence(
        &self,
        name: &TypeName,
        elements: &[TypeName],
        visiting: &mut Vec<TypeName>,
    ) -> GroupResult<Sequence> {
        if visiting.contains(name) {
            return Err(GroupError::CyclicSequence {
                sequence: name.to_string(),
            });
        }
        visiting.push(name.clone());

        let mut resolved: Vec<Group> = Vec::new();
        for element in elements {
            let groups = match self.sequence_elements(element) {
                Some(nested) => self
                    .resolve_sequence(element, &nested, visiting)?
                    .composing_groups()
                    .to_vec(),
                None => {
                    self.check_group(element)?;
                    vec![Group::new(element)]
                }
            };
            for group in groups {
                match resolved.iter().position(|g| *g == group) {
                    Some(index) if index + 1 < resolved.len() => {
                        return Err(GroupError::UnableToExpandSequence {
                            sequence: name.to_string(),
                            group: group.defining_type().to_string(),
                        });
                    }
                    Some(_) => {}
                    None => resolved.push(group),
                }
            }
        }
        visiting.pop();
        trace!(sequence = %name, groups = resolved.len(), "resolved group sequence");
        Ok(Sequence::new(name.clone(), resolved))
    }

    fn check_group(&self, group: &TypeName) -> GroupResult<()> {
        match self.types.get_type_by_name(group.as_str()) {
            None => Err(GroupError::UnknownGroup(group.to_string())),
            Some(def) if !def.is_interface() => {
                Err(GroupError::GroupNotInterface(group.to_string()))
            }
            Some(_) => Ok(()),
        }
    }

    /// Elements of a `GroupSequence` interface, or None for a plain group.
    fn sequence_elements(&self, group: &TypeName) -> Option<Vec<TypeName>> {
        let type_def = self.types.get_type_by_name(group.as_str())?;
        if !type_def.is_interface() {
            return None;
        }
        type_def
            .annotation(names::GROUP_SEQUENCE)
            .and_then(|a| a.attribute("value"))
            .and_then(|v| v.as_types())
            .map(|types| types.to_vec())
    }

    fn inherited_groups(&self, group: &TypeName) -> Vec<Group> {
        let Some(id) = self.types.type_id(group) else {
            return Vec::new();
        };
        self.types
            .super_interfaces(id)
            .into_iter()
            .filter_map(|super_id| self.types.get_type(super_id))
            .map(|def| Group::new(&def.name))
            .collect()
    }
}
