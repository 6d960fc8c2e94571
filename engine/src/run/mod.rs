//! One validation call.
//!
//! - `evaluate` - Evaluation of a single constraint and its composition
//! - `executable` - Parameter and return value validation
//!
//! A `ValidationRun` holds everything that must not outlive a call: the
//! processed-constraint and processed-bean bookkeeping, the memoized
//! default group sequences, the resolver answers and the violations.

mod evaluate;
mod executable;

pub(crate) use executable::Target;

use crate::factory::FactoryState;
use crate::interpolator::{MessageContext, MessageInterpolator};
use crate::resolver::{CachingResolver, ElementType, TraversableResolver, Traversal};
use crate::{ConstraintViolation, ValidationResult, Violations};
use beanval_core::{names, BeanIdentity, BeanRef, NodeKey, Path, TypeName, Value};
use beanval_descriptor::ConstraintDescriptor;
use beanval_groups::ValidationOrder;
use beanval_metadata::{BeanMetaData, CascadingMetaData, LocationKind, MetaConstraint};
use evaluate::Pending;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// The bean currently validated, its metadata and the path leading to it.
#[derive(Debug, Clone)]
pub(crate) struct BeanContext {
    pub bean: Option<BeanRef>,
    pub meta: Arc<BeanMetaData>,
    pub path: Path,
    /// A value standing in for one property, for `validate_value`.
    supplied: Option<(String, Value)>,
}

impl BeanContext {
    pub(crate) fn new(bean: Option<BeanRef>, meta: Arc<BeanMetaData>, path: Path) -> Self {
        Self {
            bean,
            meta,
            path,
            supplied: None,
        }
    }

    pub(crate) fn with_value(meta: Arc<BeanMetaData>, path: Path, property: impl Into<String>, value: Value) -> Self {
        Self {
            bean: None,
            meta,
            path,
            supplied: Some((property.into(), value)),
        }
    }

    fn identity(&self) -> Option<BeanIdentity> {
        self.bean.as_ref().map(BeanRef::identity)
    }

    fn raw_property(&self, name: &str) -> Value {
        match (&self.supplied, &self.bean) {
            (Some((property, value)), _) if property == name => value.clone(),
            (_, Some(bean)) => bean.property(name),
            _ => Value::Null,
        }
    }

    /// The value property constraints are checked against: optional values
    /// are unwrapped unless the property says otherwise.
    fn property_value(&self, name: &str) -> Value {
        let raw = self.raw_property(name);
        let unwraps = self
            .meta
            .property(name)
            .map(|p| p.cascading().unwrap_mode().unwraps())
            .unwrap_or(true);
        if unwraps {
            raw.unwrapped()
        } else {
            raw
        }
    }
}

/// Which constraints of a bean a group pass looks at.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    Bean,
    Property(&'a str),
}

impl Scope<'_> {
    fn includes(&self, constraint: &MetaConstraint) -> bool {
        match self {
            Scope::Bean => true,
            Scope::Property(name) => constraint.location().kind.property_name() == Some(*name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProcessedConstraint {
    bean: Option<BeanIdentity>,
    path: Path,
    constraint: usize,
}

/// The elements of a container value with their keys and node names.
pub(crate) fn container_elements(value: &Value) -> Vec<(Option<NodeKey>, &'static str, Value)> {
    match value {
        Value::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (Some(NodeKey::Index(i)), names::LIST_ELEMENT_NODE, item.clone()))
            .collect(),
        Value::Set(items) => items
            .iter()
            .map(|item| (None, names::ITERABLE_ELEMENT_NODE, item.clone()))
            .collect(),
        Value::Map(entries) => entries
            .iter()
            .map(|(key, item)| (Some(NodeKey::Key(key.to_string())), names::MAP_VALUE_NODE, item.clone()))
            .collect(),
        Value::Optional(Some(inner)) => vec![(None, names::OPTIONAL_ELEMENT_NODE, (**inner).clone())],
        _ => Vec::new(),
    }
}

pub(crate) struct ValidationRun<'v> {
    state: &'v FactoryState,
    fail_fast: bool,
    interpolator: &'v dyn MessageInterpolator,
    resolver: CachingResolver<'v>,
    root_bean: Option<BeanRef>,
    root_type: TypeName,
    executable_parameters: Option<Vec<Value>>,
    executable_return_value: Option<Value>,
    processed_constraints: HashSet<ProcessedConstraint>,
    processed_groups: HashSet<(BeanIdentity, TypeName)>,
    processed_paths: HashMap<BeanIdentity, Vec<Path>>,
    default_sequences: HashMap<(BeanIdentity, TypeName), Vec<TypeName>>,
    violations: Violations,
}

impl<'v> ValidationRun<'v> {
    pub(crate) fn new(
        state: &'v FactoryState,
        fail_fast: bool,
        interpolator: &'v dyn MessageInterpolator,
        resolver: &'v dyn TraversableResolver,
        root_bean: Option<BeanRef>,
        root_type: TypeName,
    ) -> Self {
        Self {
            state,
            fail_fast,
            interpolator,
            resolver: CachingResolver::new(resolver),
            root_bean,
            root_type,
            executable_parameters: None,
            executable_return_value: None,
            processed_constraints: HashSet::new(),
            processed_groups: HashSet::new(),
            processed_paths: HashMap::new(),
            default_sequences: HashMap::new(),
            violations: Violations::new(),
        }
    }

    pub(crate) fn with_executable_parameters(mut self, arguments: &[Value]) -> Self {
        self.executable_parameters = Some(arguments.to_vec());
        self
    }

    pub(crate) fn with_executable_return_value(mut self, value: &Value) -> Self {
        self.executable_return_value = Some(value.clone());
        self
    }

    pub(crate) fn into_violations(self) -> Violations {
        self.violations
    }

    fn should_fail_fast(&self) -> bool {
        self.fail_fast && !self.violations.is_empty()
    }

    /// Validate a bean and everything reachable from it by cascading.
    pub(crate) fn validate_bean(&mut self, ctx: &BeanContext, order: &ValidationOrder) -> ValidationResult<()> {
        self.validate_in_context(ctx, order, Scope::Bean, true)
    }

    /// Validate the constraints of one property, without cascading.
    pub(crate) fn validate_property(
        &mut self,
        ctx: &BeanContext,
        property: &str,
        order: &ValidationOrder,
    ) -> ValidationResult<()> {
        self.validate_in_context(ctx, order, Scope::Property(property), false)
    }

    fn validate_in_context(
        &mut self,
        ctx: &BeanContext,
        order: &ValidationOrder,
        scope: Scope<'_>,
        cascade: bool,
    ) -> ValidationResult<()> {
        if ctx.meta.is_default_group_sequence_redefined() {
            let sequence = self.default_sequence(&ctx.meta, ctx.bean.as_ref())?;
            order.assert_default_group_sequence_is_expandable(&sequence)?;
        }

        for group in order.groups() {
            self.validate_constraints_for_group(ctx, group.defining_type(), scope)?;
            if self.should_fail_fast() {
                return Ok(());
            }
        }
        if cascade {
            for group in order.groups() {
                self.validate_cascaded(ctx, group.defining_type())?;
                if self.should_fail_fast() {
                    return Ok(());
                }
            }
        }

        for sequence in order.sequences() {
            for step in sequence.steps() {
                let before = self.violations.len();
                for group in step {
                    self.validate_constraints_for_group(ctx, group.defining_type(), scope)?;
                    if self.should_fail_fast() {
                        return Ok(());
                    }
                    if cascade {
                        self.validate_cascaded(ctx, group.defining_type())?;
                        if self.should_fail_fast() {
                            return Ok(());
                        }
                    }
                }
                if self.violations.len() > before {
                    trace!(sequence = %sequence, "sequence stopped after failing step");
                    break;
                }
            }
        }
        Ok(())
    }

    /// The default group sequence of `meta`, asking a sequence provider at
    /// most once per bean instance and call.
    fn default_sequence(&mut self, meta: &BeanMetaData, bean: Option<&BeanRef>) -> ValidationResult<Vec<TypeName>> {
        let Some(bean) = bean.filter(|_| meta.has_default_group_sequence_provider()) else {
            return Ok(meta.default_group_sequence(bean)?);
        };
        let key = (bean.identity(), meta.bean_type().clone());
        if let Some(sequence) = self.default_sequences.get(&key) {
            return Ok(sequence.clone());
        }
        let sequence = meta.default_group_sequence(Some(bean))?;
        trace!(bean = %meta.bean_type(), groups = sequence.len(), "resolved dynamic default group sequence");
        self.default_sequences.insert(key, sequence.clone());
        Ok(sequence)
    }

    fn validate_constraints_for_group(
        &mut self,
        ctx: &BeanContext,
        group: &TypeName,
        scope: Scope<'_>,
    ) -> ValidationResult<()> {
        if !group.is_default_group() {
            for constraint in ctx.meta.meta_constraints().iter().filter(|c| scope.includes(c)) {
                self.validate_meta_constraint(ctx, constraint, group)?;
                if self.should_fail_fast() {
                    return Ok(());
                }
            }
            if matches!(scope, Scope::Bean) {
                self.mark_processed(ctx, group);
            }
            return Ok(());
        }
        self.validate_default_group(ctx, scope)
    }

    /// `Default` walks the class hierarchy. A class redefining its default
    /// sequence validates the constraints of its whole hierarchy along that
    /// sequence, which ends the walk. Otherwise each class validates the
    /// constraints declared on it and on the interfaces it implements
    /// directly; an interface's constraints are validated for the first
    /// class reaching them only.
    fn validate_default_group(&mut self, ctx: &BeanContext, scope: Scope<'_>) -> ValidationResult<()> {
        let types = Arc::clone(&self.state.types);
        let mut validated_interfaces: HashMap<TypeName, TypeName> = HashMap::new();

        for class in ctx.meta.class_hierarchy() {
            let hosting = self.state.manager.bean_meta_data(class)?;
            let Some(class_id) = types.type_id(class) else {
                continue;
            };
            let redefined = hosting.is_default_group_sequence_redefined();

            if redefined {
                let declared_in: HashSet<TypeName> = types
                    .hierarchy(class_id)
                    .into_iter()
                    .filter_map(|id| types.get_type(id))
                    .map(|def| def.name.clone())
                    .collect();
                let constraints = Self::declared_in(&ctx.meta, &declared_in, scope);
                let sequence = self.default_sequence(&hosting, ctx.bean.as_ref())?;
                let order = self.state.generator.default_validation_order(hosting.bean_type(), &sequence)?;

                'sequence: for sequence in order.sequences() {
                    for step in sequence.steps() {
                        let mut successful = true;
                        for member in step {
                            successful &= self.validate_default_element(
                                ctx,
                                &mut validated_interfaces,
                                class,
                                &constraints,
                                member.defining_type(),
                            )?;
                            if self.should_fail_fast() {
                                return Ok(());
                            }
                        }
                        if !successful {
                            break 'sequence;
                        }
                    }
                }
            } else {
                let mut declared_in: HashSet<TypeName> = types
                    .directly_implemented_interfaces(class_id)
                    .into_iter()
                    .filter_map(|id| types.get_type(id))
                    .map(|def| def.name.clone())
                    .collect();
                declared_in.insert(class.clone());
                let constraints = Self::declared_in(&ctx.meta, &declared_in, scope);
                self.validate_default_element(
                    ctx,
                    &mut validated_interfaces,
                    class,
                    &constraints,
                    &TypeName::default_group(),
                )?;
                if self.should_fail_fast() {
                    return Ok(());
                }
            }

            if matches!(scope, Scope::Bean) {
                self.mark_processed(ctx, &TypeName::default_group());
            }
            if redefined {
                break;
            }
        }
        Ok(())
    }

    // The bean's own constraint instances, so the processed-constraint
    // bookkeeping sees the same constraint whichever class reached it.
    fn declared_in(meta: &BeanMetaData, types: &HashSet<TypeName>, scope: Scope<'_>) -> Vec<Arc<MetaConstraint>> {
        meta.meta_constraints()
            .iter()
            .filter(|c| types.contains(c.declaring_type()) && scope.includes(c))
            .cloned()
            .collect()
    }

    fn validate_default_element(
        &mut self,
        ctx: &BeanContext,
        validated_interfaces: &mut HashMap<TypeName, TypeName>,
        class: &TypeName,
        constraints: &[Arc<MetaConstraint>],
        group: &TypeName,
    ) -> ValidationResult<bool> {
        let mut successful = true;
        for constraint in constraints {
            let declaring = constraint.declaring_type();
            if self.state.types.is_interface(declaring) {
                match validated_interfaces.get(declaring) {
                    Some(validated_for) if validated_for != class => continue,
                    Some(_) => {}
                    None => {
                        validated_interfaces.insert(declaring.clone(), class.clone());
                    }
                }
            }
            successful &= self.validate_meta_constraint(ctx, constraint, group)?;
            if self.should_fail_fast() {
                return Ok(false);
            }
        }
        Ok(successful)
    }

    /// Validate one bean-level constraint for a group. Returns false if it
    /// produced violations.
    fn validate_meta_constraint(
        &mut self,
        ctx: &BeanContext,
        constraint: &Arc<MetaConstraint>,
        group: &TypeName,
    ) -> ValidationResult<bool> {
        if !constraint.belongs_to(group) {
            return Ok(true);
        }

        match &constraint.location().kind {
            LocationKind::Bean => {
                let Some(bean) = &ctx.bean else {
                    return Ok(true);
                };
                let path = ctx.path.add_bean();
                let value = Value::Bean(bean.clone());
                self.validate_once(ctx, constraint, &path, &ctx.path, &value)
            }
            LocationKind::Property(name) => {
                let path = ctx.path.add_property(name);
                if !self.is_reachable(ctx, &path)? {
                    return Ok(true);
                }
                let value = ctx.property_value(name);
                self.validate_once(ctx, constraint, &path, &path, &value)
            }
            LocationKind::ContainerElement(parent) => {
                let Some(name) = parent.property_name() else {
                    return Ok(true);
                };
                let property_path = ctx.path.add_property(name);
                if !self.is_reachable(ctx, &property_path)? {
                    return Ok(true);
                }
                let mut successful = true;
                for (key, node, element) in container_elements(&ctx.raw_property(name)) {
                    let path = property_path.enter_element(key).add_container_element(node);
                    successful &= self.validate_once(ctx, constraint, &path, &path, &element)?;
                    if self.should_fail_fast() {
                        break;
                    }
                }
                Ok(successful)
            }
            _ => Ok(true),
        }
    }

    fn is_reachable(&mut self, ctx: &BeanContext, path: &Path) -> ValidationResult<bool> {
        let Some(node) = path.leaf() else {
            return Ok(true);
        };
        let traversal = Traversal {
            bean: ctx.bean.as_ref(),
            node,
            root_type: &self.root_type,
            path_to_bean: &ctx.path,
            element_type: ElementType::Property,
        };
        self.resolver.is_reachable(&traversal)
    }

    /// Evaluate a constraint unless it was already evaluated for this bean
    /// and path during the call.
    fn validate_once(
        &mut self,
        ctx: &BeanContext,
        constraint: &Arc<MetaConstraint>,
        path: &Path,
        custom_base: &Path,
        value: &Value,
    ) -> ValidationResult<bool> {
        let key = ProcessedConstraint {
            bean: ctx.identity(),
            path: path.clone(),
            constraint: Arc::as_ptr(constraint) as usize,
        };
        if self.processed_constraints.contains(&key) {
            return Ok(true);
        }
        let valid = self.validate_constraint(constraint.descriptor(), value, path, custom_base, ctx.bean.as_ref())?;
        self.processed_constraints.insert(key);
        Ok(valid)
    }

    fn validate_constraint(
        &mut self,
        descriptor: &Arc<ConstraintDescriptor>,
        value: &Value,
        path: &Path,
        custom_base: &Path,
        leaf: Option<&BeanRef>,
    ) -> ValidationResult<bool> {
        let pending = evaluate::evaluate(&self.state.validators, descriptor, value, path)?;
        if pending.is_empty() {
            return Ok(true);
        }
        for violation in pending {
            self.report(violation, value, path, custom_base, leaf);
        }
        Ok(false)
    }

    fn report(&mut self, pending: Pending, value: &Value, path: &Path, custom_base: &Path, leaf: Option<&BeanRef>) {
        let violation_path = if pending.property_nodes.is_empty() {
            path.clone()
        } else {
            pending
                .property_nodes
                .iter()
                .fold(custom_base.clone(), |path, node| path.add_property(node))
        };
        let message = self.interpolator.interpolate(
            &pending.template,
            &MessageContext {
                descriptor: &pending.descriptor,
                validated_value: value,
            },
        );
        let violation = ConstraintViolation::new(
            message,
            pending.template,
            self.root_type.clone(),
            violation_path,
            value.clone(),
            pending.descriptor,
        )
        .with_root_bean(self.root_bean.clone())
        .with_leaf_bean(leaf.cloned())
        .with_executable_parameters(self.executable_parameters.clone())
        .with_executable_return_value(self.executable_return_value.clone());
        self.violations.push(violation);
    }

    fn validate_cascaded(&mut self, ctx: &BeanContext, group: &TypeName) -> ValidationResult<()> {
        let Some(bean) = &ctx.bean else {
            return Ok(());
        };
        for property in ctx.meta.cascadables() {
            let path = ctx.path.add_property(property.name());
            let Some(node) = path.leaf() else {
                continue;
            };
            let traversal = Traversal {
                bean: Some(bean),
                node,
                root_type: &self.root_type,
                path_to_bean: &ctx.path,
                element_type: ElementType::Property,
            };
            if !self.resolver.is_cascade_required(&traversal)? {
                trace!(path = %path, "cascade skipped by traversable resolver");
                continue;
            }
            let value = bean.property(property.name());
            self.cascade_value(&value, &path, group, property.cascading())?;
            if self.should_fail_fast() {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Cascade into a value: a bean, or each bean element of a container.
    fn cascade_value(
        &mut self,
        value: &Value,
        path: &Path,
        group: &TypeName,
        cascading: &CascadingMetaData,
    ) -> ValidationResult<()> {
        let value = if cascading.unwrap_mode().unwraps() {
            value.unwrapped()
        } else {
            value.clone()
        };
        if let Value::Bean(bean) = &value {
            return self.cascade_bean(bean, path.clone(), group, cascading);
        }
        for (key, _, element) in container_elements(&value) {
            if let Value::Bean(bean) = element.unwrapped() {
                self.cascade_bean(&bean, path.enter_element(key), group, cascading)?;
                if self.should_fail_fast() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn cascade_bean(
        &mut self,
        bean: &BeanRef,
        path: Path,
        group: &TypeName,
        cascading: &CascadingMetaData,
    ) -> ValidationResult<()> {
        if self.is_already_validated(bean, group, &path) {
            trace!(path = %path, group = %group, "bean already validated");
            return Ok(());
        }
        let converted = cascading.convert_group(group);
        let order = self
            .state
            .generator
            .validation_order_for(&converted, &converted != group)?;
        let meta = self.state.manager.bean_meta_data(bean.bean_type())?;
        trace!(path = %path, group = %converted, bean = %meta.bean_type(), "cascading");
        let ctx = BeanContext::new(Some(bean.clone()), meta, path);
        self.validate_bean(&ctx, &order)
    }

    /// A bean is skipped when it was validated for the group on a path
    /// related to this one: either path extends the other.
    fn is_already_validated(&self, bean: &BeanRef, group: &TypeName, path: &Path) -> bool {
        let identity = bean.identity();
        if !self.processed_groups.contains(&(identity, group.clone())) {
            return false;
        }
        self.processed_paths.get(&identity).is_some_and(|paths| {
            paths
                .iter()
                .any(|p| path.is_root() || p.is_root() || path.starts_with(p) || p.starts_with(path))
        })
    }

    fn mark_processed(&mut self, ctx: &BeanContext, group: &TypeName) {
        let Some(identity) = ctx.identity() else {
            return;
        };
        self.processed_groups.insert((identity, group.clone()));
        let paths = self.processed_paths.entry(identity).or_default();
        if !paths.contains(&ctx.path) {
            paths.push(ctx.path.clone());
        }
    }
}
