//! The validator.

use crate::factory::FactoryState;
use crate::interpolator::MessageInterpolator;
use crate::resolver::TraversableResolver;
use crate::run::{BeanContext, Target, ValidationRun};
use crate::{ValidationError, ValidationResult, Violations};
use beanval_core::{BeanRef, CoreError, Node, NodeKey, Path, TypeName, Value};
use beanval_groups::ValidationOrder;
use beanval_metadata::{BeanMetaData, ExecutableMetaData};
use beanval_types::{ExecutableKind, Signature, ValueType};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Validates beans, single properties and executable calls.
///
/// Every call takes the groups to validate; no groups means `Default`.
/// Violations are the successful result of a call. Errors are reserved for
/// broken metadata, unknown properties or executables, and collaborators
/// that fail.
#[derive(Clone)]
pub struct Validator {
    state: Arc<FactoryState>,
    fail_fast: bool,
    interpolator: Arc<dyn MessageInterpolator>,
    resolver: Arc<dyn TraversableResolver>,
}

impl Validator {
    pub(crate) fn new(
        state: Arc<FactoryState>,
        fail_fast: bool,
        interpolator: Arc<dyn MessageInterpolator>,
        resolver: Arc<dyn TraversableResolver>,
    ) -> Self {
        Self {
            state,
            fail_fast,
            interpolator,
            resolver,
        }
    }

    pub fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// The metadata of a bean type.
    pub fn bean_meta_data(&self, bean_type: impl Into<TypeName>) -> ValidationResult<Arc<BeanMetaData>> {
        Ok(self.state.manager.bean_meta_data(&bean_type.into())?)
    }

    /// Returns true if any element of the type's hierarchy is constrained
    /// or cascaded.
    pub fn is_constrained(&self, bean_type: impl Into<TypeName>) -> ValidationResult<bool> {
        Ok(self.bean_meta_data(bean_type)?.has_constraints())
    }

    /// Validate a bean and, through cascading, everything reachable from it.
    pub fn validate(&self, bean: &BeanRef, groups: &[TypeName]) -> ValidationResult<Violations> {
        let meta = self.bean_meta_data(bean.bean_type())?;
        if !meta.has_constraints() {
            return Ok(Violations::new());
        }
        let order = self.validation_order(groups)?;

        let mut run = self.run(Some(bean.clone()), meta.bean_type().clone());
        let ctx = BeanContext::new(Some(bean.clone()), meta, Path::root());
        run.validate_bean(&ctx, &order)?;

        let violations = run.into_violations();
        debug!(bean = %bean.bean_type(), violations = violations.len(), "validated bean");
        Ok(violations)
    }

    /// Validate the constraints of one property, addressed by a path such
    /// as `orders[0].customer.name`. Nothing is cascaded. A null bean on
    /// the way to the property yields no violations.
    pub fn validate_property(
        &self,
        bean: &BeanRef,
        property_path: &str,
        groups: &[TypeName],
    ) -> ValidationResult<Violations> {
        let path = Path::parse(property_path)?;
        if path.ends_in_element() {
            return Err(CoreError::invalid_property_path(property_path, "path ends in a container element").into());
        }
        let nodes = path.nodes();
        let Some((leaf, intermediate)) = nodes.split_last() else {
            return Err(CoreError::invalid_property_path(property_path, "path is empty").into());
        };

        let mut current = bean.clone();
        let mut meta = self.bean_meta_data(bean.bean_type())?;
        let mut bean_path = Path::root();
        for (i, node) in intermediate.iter().enumerate() {
            self.check_property(&meta, node.name())?;
            let next = &nodes[i + 1];
            let mut value = current.property(node.name()).unwrapped();
            bean_path = bean_path.add_property(node.name());
            if next.in_iterable {
                value = element_at(&value, next.key.as_ref(), property_path)?;
                bean_path = bean_path.enter_element(next.key.clone());
            }
            match value {
                Value::Null => return Ok(Violations::new()),
                Value::Bean(bean) => {
                    meta = self.bean_meta_data(bean.bean_type())?;
                    current = bean;
                }
                other => {
                    return Err(CoreError::invalid_property_path(
                        property_path,
                        format!("'{}' is a {}, not a bean", node.name(), other.type_name()),
                    )
                    .into());
                }
            }
        }
        self.check_property(&meta, leaf.name())?;

        let order = self.validation_order(groups)?;
        let mut run = self.run(Some(bean.clone()), bean.bean_type().clone());
        let ctx = BeanContext::new(Some(current), meta, bean_path);
        run.validate_property(&ctx, leaf.name(), &order)?;
        Ok(run.into_violations())
    }

    /// Validate a value as if it were the value of a property of a bean
    /// type. Intermediate properties are resolved through their declared
    /// types and no bean instance is involved.
    pub fn validate_value(
        &self,
        bean_type: &TypeName,
        property_path: &str,
        value: Value,
        groups: &[TypeName],
    ) -> ValidationResult<Violations> {
        let path = Path::parse(property_path)?;
        if path.ends_in_element() {
            return Err(CoreError::invalid_property_path(property_path, "path ends in a container element").into());
        }
        let nodes = path.nodes();
        let Some((leaf, intermediate)) = nodes.split_last() else {
            return Err(CoreError::invalid_property_path(property_path, "path is empty").into());
        };

        let mut meta = self.bean_meta_data(bean_type)?;
        let mut bean_path = Path::root();
        for (i, node) in intermediate.iter().enumerate() {
            let value_type = self.property_type(&meta, node.name())?;
            bean_path = bean_path.add_property(node.name());
            let next: &Node = &nodes[i + 1];
            if next.in_iterable {
                bean_path = bean_path.enter_element(next.key.clone());
            }
            meta = self.bean_meta_data(value_type.innermost())?;
        }
        self.check_property(&meta, leaf.name())?;

        let order = self.validation_order(groups)?;
        let mut run = self.run(None, bean_type.clone());
        let ctx = BeanContext::with_value(meta, bean_path, leaf.name(), value);
        run.validate_property(&ctx, leaf.name(), &order)?;
        Ok(run.into_violations())
    }

    /// Validate the arguments of a method call on `object`.
    pub fn validate_parameters(
        &self,
        object: &BeanRef,
        signature: &Signature,
        arguments: &[Value],
        groups: &[TypeName],
    ) -> ValidationResult<Violations> {
        let meta = self.bean_meta_data(object.bean_type())?;
        let Some(executable) = self.executable(&meta, ExecutableKind::Method, signature)? else {
            return Ok(Violations::new());
        };
        check_arity(&executable, arguments)?;

        let order = self.validation_order(groups)?;
        let mut run = self
            .run(Some(object.clone()), meta.bean_type().clone())
            .with_executable_parameters(arguments);
        let ctx = BeanContext::new(Some(object.clone()), meta, Path::root());
        run.validate_executable(&ctx, &executable, Target::Parameters(arguments), &order)?;
        Ok(run.into_violations())
    }

    /// Validate the value returned by a method call on `object`.
    pub fn validate_return_value(
        &self,
        object: &BeanRef,
        signature: &Signature,
        return_value: &Value,
        groups: &[TypeName],
    ) -> ValidationResult<Violations> {
        let meta = self.bean_meta_data(object.bean_type())?;
        let Some(executable) = self.executable(&meta, ExecutableKind::Method, signature)? else {
            return Ok(Violations::new());
        };

        let order = self.validation_order(groups)?;
        let mut run = self
            .run(Some(object.clone()), meta.bean_type().clone())
            .with_executable_return_value(return_value);
        let ctx = BeanContext::new(Some(object.clone()), meta, Path::root());
        run.validate_executable(&ctx, &executable, Target::ReturnValue(return_value), &order)?;
        Ok(run.into_violations())
    }

    /// Validate the arguments of a constructor call. There is no bean yet,
    /// so violations carry no root bean.
    pub fn validate_constructor_parameters(
        &self,
        bean_type: &TypeName,
        signature: &Signature,
        arguments: &[Value],
        groups: &[TypeName],
    ) -> ValidationResult<Violations> {
        let meta = self.bean_meta_data(bean_type)?;
        let Some(executable) = self.executable(&meta, ExecutableKind::Constructor, signature)? else {
            return Ok(Violations::new());
        };
        check_arity(&executable, arguments)?;

        let order = self.validation_order(groups)?;
        let mut run = self
            .run(None, meta.bean_type().clone())
            .with_executable_parameters(arguments);
        let ctx = BeanContext::new(None, meta, Path::root());
        run.validate_executable(&ctx, &executable, Target::Parameters(arguments), &order)?;
        Ok(run.into_violations())
    }

    /// Validate the bean created by a constructor call.
    pub fn validate_constructor_return_value(
        &self,
        bean_type: &TypeName,
        signature: &Signature,
        created: &BeanRef,
        groups: &[TypeName],
    ) -> ValidationResult<Violations> {
        let meta = self.bean_meta_data(bean_type)?;
        let Some(executable) = self.executable(&meta, ExecutableKind::Constructor, signature)? else {
            return Ok(Violations::new());
        };

        let order = self.validation_order(groups)?;
        let returned = Value::Bean(created.clone());
        let mut run = self
            .run(Some(created.clone()), meta.bean_type().clone())
            .with_executable_return_value(&returned);
        let ctx = BeanContext::new(Some(created.clone()), meta, Path::root());
        run.validate_executable(&ctx, &executable, Target::ReturnValue(&returned), &order)?;
        Ok(run.into_violations())
    }

    fn run(&self, root_bean: Option<BeanRef>, root_type: TypeName) -> ValidationRun<'_> {
        ValidationRun::new(
            &self.state,
            self.fail_fast,
            self.interpolator.as_ref(),
            self.resolver.as_ref(),
            root_bean,
            root_type,
        )
    }

    fn validation_order(&self, groups: &[TypeName]) -> ValidationResult<ValidationOrder> {
        if groups.is_empty() {
            return Ok(self.state.generator.validation_order(&[TypeName::default_group()])?);
        }
        Ok(self.state.generator.validation_order(groups)?)
    }

    /// An executable's metadata. `None` for an executable the hierarchy
    /// declares without any constraint.
    fn executable(
        &self,
        meta: &BeanMetaData,
        kind: ExecutableKind,
        signature: &Signature,
    ) -> ValidationResult<Option<Arc<ExecutableMetaData>>> {
        let found = match kind {
            ExecutableKind::Method => meta.executable(signature),
            ExecutableKind::Constructor => meta.constructor(signature),
        };
        if let Some(executable) = found {
            return Ok(Some(Arc::clone(executable)));
        }

        let types = &self.state.types;
        let declared = match kind {
            ExecutableKind::Method => meta
                .hierarchy()
                .iter()
                .filter_map(|name| types.get_type_by_name(name.as_str()))
                .any(|def| def.method(signature).is_some()),
            ExecutableKind::Constructor => types
                .get_type_by_name(meta.bean_type().as_str())
                .is_some_and(|def| def.constructor(signature).is_some()),
        };
        if declared {
            Ok(None)
        } else {
            Err(ValidationError::unknown_executable(meta.bean_type().as_str(), signature.to_string()))
        }
    }

    fn check_property(&self, meta: &BeanMetaData, name: &str) -> ValidationResult<()> {
        self.property_type(meta, name).map(|_| ())
    }

    /// The declared type of a property, from its metadata or from the
    /// field or getter declaring it.
    fn property_type(&self, meta: &BeanMetaData, name: &str) -> ValidationResult<ValueType> {
        if let Some(property) = meta.property(name) {
            return Ok(property.value_type().clone());
        }
        meta.hierarchy()
            .iter()
            .filter_map(|type_name| self.state.types.get_type_by_name(type_name.as_str()))
            .find_map(|def| {
                def.property(name).map(|p| p.value_type.clone()).or_else(|| {
                    def.methods
                        .iter()
                        .find(|m| m.getter_property_name().as_deref() == Some(name))
                        .and_then(|m| m.return_type.clone())
                })
            })
            .ok_or_else(|| ValidationError::unknown_property(meta.bean_type().as_str(), name))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("fail_fast", &self.fail_fast).finish()
    }
}

fn check_arity(executable: &ExecutableMetaData, arguments: &[Value]) -> ValidationResult<()> {
    let expected = executable.parameters().len();
    if arguments.len() != expected {
        return Err(ValidationError::ArgumentCountMismatch {
            executable: executable.signature().to_string(),
            expected,
            actual: arguments.len(),
        });
    }
    Ok(())
}

/// The element of a container addressed by a path key. A missing element
/// is `Null`.
fn element_at(container: &Value, key: Option<&NodeKey>, path: &str) -> ValidationResult<Value> {
    let element = match (container, key) {
        (Value::Null, _) => Value::Null,
        (Value::List(items), Some(NodeKey::Index(i))) => items.get(*i).cloned().unwrap_or(Value::Null),
        (Value::Map(entries), Some(key)) => {
            let key = key.to_string();
            entries
                .iter()
                .find(|(k, _)| k.to_string() == key)
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null)
        }
        (other, _) => {
            return Err(CoreError::invalid_property_path(
                path,
                format!("a {} cannot be indexed by {}", other.type_name(), key.map(|k| k.to_string()).unwrap_or_default()),
            )
            .into());
        }
    };
    Ok(element.unwrapped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidatorFactory;
    use beanval_core::{names, Annotation, DynamicBean};
    use beanval_descriptor::builtin;
    use beanval_types::{MethodDef, ParameterDef, PropertyDef, TypeRegistry, TypeRegistryBuilder};
    use pretty_assertions::assert_eq;

    const ORDER: &str = "com.acme.Order";
    const CUSTOMER: &str = "com.acme.Customer";
    const LINE: &str = "com.acme.OrderLine";

    fn types() -> TypeRegistry {
        let mut builder = TypeRegistryBuilder::new();
        builder
            .add_class(CUSTOMER)
            .property(PropertyDef::new("name", ValueType::named("String")).annotate(builtin::not_null()))
            .done()
            .unwrap();
        builder
            .add_class(LINE)
            .property(PropertyDef::new("quantity", ValueType::named("int")).annotate(builtin::min(1)))
            .done()
            .unwrap();
        builder
            .add_class(ORDER)
            .property(PropertyDef::new("id", ValueType::named("String")).annotate(builtin::not_null()))
            .property(
                PropertyDef::new("customer", ValueType::named(CUSTOMER)).annotate(Annotation::new(names::VALID)),
            )
            .property(
                PropertyDef::new("lines", ValueType::list(ValueType::named(LINE)))
                    .annotate(Annotation::new(names::VALID))
                    .annotate(builtin::size(1, 10)),
            )
            .property(PropertyDef::new("note", ValueType::named("String")))
            .method(
                MethodDef::new("ship")
                    .param(ParameterDef::new("days", ValueType::named("int")).annotate(builtin::max(30)))
                    .returns(ValueType::named("String"))
                    .annotate(builtin::not_null()),
            )
            .done()
            .unwrap();
        builder.build()
    }

    fn validator() -> Validator {
        ValidatorFactory::builder(types()).build().unwrap().validator()
    }

    fn line(quantity: i64) -> Value {
        DynamicBean::new(LINE).with("quantity", quantity).into_ref().into()
    }

    fn order(id: Value, customer: Value, lines: Vec<Value>) -> BeanRef {
        DynamicBean::new(ORDER)
            .with("id", id)
            .with("customer", customer)
            .with("lines", Value::List(lines))
            .into_ref()
    }

    fn customer(name: Value) -> Value {
        DynamicBean::new(CUSTOMER).with("name", name).into_ref().into()
    }

    // ========== TEST: validate_cascades_into_beans_and_lists ==========
    #[test]
    fn test_validate_cascades_into_beans_and_lists() {
        // GIVEN an order without id, an anonymous customer and a bad line
        let order = order(Value::Null, customer(Value::Null), vec![line(2), line(0)]);

        // WHEN validating it
        let violations = validator().validate(&order, &[]).unwrap();

        // THEN each violation is reported at its path
        assert_eq!(violations.paths(), vec!["customer.name", "id", "lines[1].quantity"]);
        let id = violations.at("id").next().unwrap();
        assert_eq!(id.message, "must not be null");
        assert_eq!(id.root_bean.as_ref(), Some(&order));
        assert_eq!(id.leaf_bean.as_ref(), Some(&order));
    }

    // ========== TEST: validate_property ==========
    #[test]
    fn test_validate_property() {
        let order = order(Value::Null, customer(Value::Null), vec![line(0)]);
        let validator = validator();

        let id = validator.validate_property(&order, "id", &[]).unwrap();
        let name = validator.validate_property(&order, "customer.name", &[]).unwrap();
        let quantity = validator.validate_property(&order, "lines[0].quantity", &[]).unwrap();
        let missing_line = validator.validate_property(&order, "lines[5].quantity", &[]).unwrap();

        assert_eq!(id.paths(), vec!["id"]);
        assert_eq!(name.paths(), vec!["customer.name"]);
        assert_eq!(quantity.paths(), vec!["lines[0].quantity"]);
        assert!(missing_line.is_empty());
    }

    // ========== TEST: validate_property_does_not_cascade ==========
    #[test]
    fn test_validate_property_does_not_cascade() {
        let order = order(Value::from("A-1"), customer(Value::Null), vec![line(1)]);

        let violations = validator().validate_property(&order, "customer", &[]).unwrap();

        assert!(violations.is_empty());
    }

    // ========== TEST: validate_property_errors ==========
    #[test]
    fn test_validate_property_errors() {
        let order = order(Value::from("A-1"), customer(Value::from("Ann")), vec![]);
        let validator = validator();

        assert!(matches!(
            validator.validate_property(&order, "total", &[]),
            Err(ValidationError::UnknownProperty { .. })
        ));
        assert!(matches!(
            validator.validate_property(&order, "id.length", &[]),
            Err(ValidationError::InvalidPropertyPath(_))
        ));
        assert!(matches!(
            validator.validate_property(&order, "lines[0]", &[]),
            Err(ValidationError::InvalidPropertyPath(_))
        ));
        // Declared but unconstrained
        assert!(validator.validate_property(&order, "note", &[]).unwrap().is_empty());
    }

    // ========== TEST: validate_value ==========
    #[test]
    fn test_validate_value() {
        let validator = validator();

        let id = validator.validate_value(&TypeName::new(ORDER), "id", Value::Null, &[]).unwrap();
        let name = validator
            .validate_value(&TypeName::new(ORDER), "customer.name", Value::Null, &[])
            .unwrap();
        let quantity = validator
            .validate_value(&TypeName::new(ORDER), "lines[3].quantity", Value::from(0), &[])
            .unwrap();

        assert_eq!(id.paths(), vec!["id"]);
        assert!(id.all()[0].root_bean.is_none());
        assert_eq!(name.paths(), vec!["customer.name"]);
        assert_eq!(quantity.paths(), vec!["lines[3].quantity"]);
    }

    // ========== TEST: method_validation ==========
    #[test]
    fn test_method_validation() {
        // GIVEN a method with a constrained parameter and return value
        let validator = validator();
        let order = order(Value::from("A-1"), customer(Value::from("Ann")), vec![line(1)]);
        let ship = Signature::new("ship", ["int"]);

        // WHEN validating its arguments and its return value
        let parameters = validator
            .validate_parameters(&order, &ship, &[Value::from(45)], &[])
            .unwrap();
        let returned = validator
            .validate_return_value(&order, &ship, &Value::Null, &[])
            .unwrap();

        // THEN the violations are reported on the executable's nodes
        assert_eq!(parameters.paths(), vec!["ship.days"]);
        assert_eq!(parameters.all()[0].executable_parameters, Some(vec![Value::from(45)]));
        assert_eq!(returned.paths(), vec!["ship.<return value>"]);
        assert_eq!(returned.all()[0].executable_return_value, Some(Value::Null));
    }

    // ========== TEST: executable_errors ==========
    #[test]
    fn test_executable_errors() {
        let validator = validator();
        let order = order(Value::from("A-1"), customer(Value::from("Ann")), vec![]);

        assert!(matches!(
            validator.validate_parameters(&order, &Signature::new("ship", ["int"]), &[], &[]),
            Err(ValidationError::ArgumentCountMismatch { expected: 1, actual: 0, .. })
        ));
        assert!(matches!(
            validator.validate_parameters(&order, &Signature::new("cancel", Vec::<String>::new()), &[], &[]),
            Err(ValidationError::UnknownExecutable { .. })
        ));
    }

    #[test]
    fn test_unconstrained_bean() {
        let mut builder = TypeRegistryBuilder::new();
        builder
            .add_class("com.acme.Plain")
            .property(PropertyDef::new("text", ValueType::named("String")))
            .done()
            .unwrap();
        let validator = ValidatorFactory::builder(builder.build()).build().unwrap().validator();
        let plain = DynamicBean::new("com.acme.Plain").into_ref();

        assert!(!validator.is_constrained("com.acme.Plain").unwrap());
        assert!(validator.validate(&plain, &[]).unwrap().is_empty());
    }
}
