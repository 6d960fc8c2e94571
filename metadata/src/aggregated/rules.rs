//! Rules for executables declared on several types of a hierarchy.
//!
//! Each rule looks at two declarations of the same signature. Rules run
//! one after another over all ordered pairs, in this order:
//!
//! 1. An overriding method must not alter parameter constraints
//! 2. Parallel methods must not define parameter constraints
//! 3. A void method must not be return-value constrained
//! 4. A return value is marked cascaded once per hierarchy line
//! 5. Parallel methods must not define group conversions for a cascaded
//!    return value

use crate::{ConstrainedExecutable, MetaDataError, MetaDataResult};
use beanval_core::TypeName;
use beanval_types::{TypeId, TypeRegistry};
use serde::{Deserialize, Serialize};

/// Relaxations of the executable rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodValidationConfig {
    pub allow_overriding_method_alter_parameter_constraint: bool,
    pub allow_parallel_methods_define_parameter_constraints: bool,
    pub allow_multiple_cascaded_validation_on_return_values: bool,
}

impl MethodValidationConfig {
    pub fn with_overriding_method_alter_parameter_constraint(mut self, allow: bool) -> Self {
        self.allow_overriding_method_alter_parameter_constraint = allow;
        self
    }

    pub fn with_parallel_methods_define_parameter_constraints(mut self, allow: bool) -> Self {
        self.allow_parallel_methods_define_parameter_constraints = allow;
        self
    }

    pub fn with_multiple_cascaded_validation_on_return_values(mut self, allow: bool) -> Self {
        self.allow_multiple_cascaded_validation_on_return_values = allow;
        self
    }
}

/// One type's merged declaration of an executable.
#[derive(Debug, Clone)]
pub(crate) struct Declaration {
    pub type_id: TypeId,
    pub type_name: TypeName,
    pub executable: ConstrainedExecutable,
}

type Rule = fn(&RuleContext<'_>, &Declaration, &Declaration) -> MetaDataResult<()>;

struct RuleContext<'a> {
    types: &'a TypeRegistry,
    config: &'a MethodValidationConfig,
    /// Some declaration of the signature has parameter constraints.
    parameters_constrained: bool,
    /// Declaring types parallel to another declaring type, sorted.
    parallel_types: Vec<String>,
}

impl RuleContext<'_> {
    /// `a` is declared on a strict subtype of the type declaring `b`.
    fn is_defined_on_subtype(&self, a: &Declaration, b: &Declaration) -> bool {
        a.type_id != b.type_id && self.types.is_subtype(a.type_id, b.type_id)
    }

    fn is_defined_on_parallel_type(&self, a: &Declaration, b: &Declaration) -> bool {
        a.type_id != b.type_id && self.types.is_parallel(a.type_id, b.type_id)
    }
}

const RULES: [Rule; 5] = [
    overriding_method_must_not_alter_parameter_constraints,
    parallel_methods_must_not_define_parameter_constraints,
    void_methods_must_not_be_return_value_constrained,
    return_value_may_only_be_marked_once_as_cascaded,
    parallel_methods_must_not_define_group_conversion_for_cascaded_return_value,
];

/// Check all declarations of one signature. The declarations are in
/// hierarchy order, one per declaring type.
pub(crate) fn check_declarations(
    types: &TypeRegistry,
    config: &MethodValidationConfig,
    declarations: &[Declaration],
) -> MetaDataResult<()> {
    let parameters_constrained = declarations.iter().any(|d| d.executable.has_parameter_constraints());
    let mut parallel_types: Vec<String> = declarations
        .iter()
        .filter(|d| {
            declarations
                .iter()
                .any(|other| other.type_id != d.type_id && types.is_parallel(d.type_id, other.type_id))
        })
        .map(|d| d.type_name.to_string())
        .collect();
    parallel_types.sort();
    parallel_types.dedup();

    let context = RuleContext {
        types,
        config,
        parameters_constrained,
        parallel_types,
    };
    for rule in RULES {
        for method in declarations {
            for other in declarations {
                rule(&context, method, other)?;
            }
        }
    }
    Ok(())
}

fn overriding_method_must_not_alter_parameter_constraints(
    context: &RuleContext<'_>,
    method: &Declaration,
    other: &Declaration,
) -> MetaDataResult<()> {
    if context.config.allow_overriding_method_alter_parameter_constraint {
        return Ok(());
    }
    if context.is_defined_on_subtype(method, other) && method.executable.has_parameter_constraints() {
        return Err(MetaDataError::parameter_constraints_altered(
            method.executable.signature.to_string(),
            method.type_name.as_str(),
            other.type_name.as_str(),
        ));
    }
    Ok(())
}

fn parallel_methods_must_not_define_parameter_constraints(
    context: &RuleContext<'_>,
    method: &Declaration,
    other: &Declaration,
) -> MetaDataResult<()> {
    if context.config.allow_parallel_methods_define_parameter_constraints {
        return Ok(());
    }
    // Any constrained declaration counts, even one both parallel types inherit
    if context.parameters_constrained && context.is_defined_on_parallel_type(method, other) {
        return Err(MetaDataError::ParallelParameterConstraints {
            method: method.executable.signature.to_string(),
            types: context.parallel_types.clone(),
        });
    }
    Ok(())
}

fn void_methods_must_not_be_return_value_constrained(
    _context: &RuleContext<'_>,
    method: &Declaration,
    _other: &Declaration,
) -> MetaDataResult<()> {
    if method.executable.is_void() && method.executable.is_return_value_constrained() {
        return Err(MetaDataError::VoidMethodConstrained {
            method: method.executable.signature.to_string(),
            declaring_type: method.type_name.to_string(),
        });
    }
    Ok(())
}

fn return_value_may_only_be_marked_once_as_cascaded(
    context: &RuleContext<'_>,
    method: &Declaration,
    other: &Declaration,
) -> MetaDataResult<()> {
    if context.config.allow_multiple_cascaded_validation_on_return_values {
        return Ok(());
    }
    let both_cascaded =
        method.executable.return_cascading.cascading && other.executable.return_cascading.cascading;
    if both_cascaded && context.is_defined_on_subtype(method, other) {
        return Err(MetaDataError::return_value_cascaded_twice(
            method.executable.signature.to_string(),
            method.type_name.as_str(),
            other.type_name.as_str(),
        ));
    }
    Ok(())
}

fn parallel_methods_must_not_define_group_conversion_for_cascaded_return_value(
    context: &RuleContext<'_>,
    method: &Declaration,
    other: &Declaration,
) -> MetaDataResult<()> {
    let (a, b) = (&method.executable.return_cascading, &other.executable.return_cascading);
    let cascaded = a.cascading || b.cascading;
    let converted = !a.group_conversions.is_empty() || !b.group_conversions.is_empty();
    if context.is_defined_on_parallel_type(method, other) && cascaded && converted {
        let mut types = vec![method.type_name.to_string(), other.type_name.to_string()];
        types.sort();
        return Err(MetaDataError::ParallelGroupConversion {
            method: method.executable.signature.to_string(),
            types,
        });
    }
    Ok(())
}
