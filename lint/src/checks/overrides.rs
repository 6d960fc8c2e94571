//! Overridden and parallel methods.

use super::{has_parameter_constraints, is_return_value_cascaded};
use crate::linter::Context;
use crate::{Diagnostic, Diagnostics};
use beanval_types::{MethodDef, Signature, TypeDef, TypeId};
use std::collections::BTreeMap;

pub(crate) fn check(ctx: &Context<'_>, type_def: &TypeDef, diagnostics: &mut Diagnostics) {
    for method in type_def.methods.iter().filter(|m| !m.is_private()) {
        let signature = method.signature();
        let overridden = ctx.types.overridden_methods(type_def.id, &signature);
        if overridden.is_empty() {
            continue;
        }

        if !ctx.config.allow_overriding_method_alter_parameter_constraint && has_parameter_constraints(ctx, method) {
            for (super_id, _) in &overridden {
                diagnostics.push(Diagnostic::error(
                    type_def.name.as_str(),
                    signature.to_string(),
                    format!(
                        "overrides the method declared by {} and must not alter its parameter constraints",
                        type_name(ctx, *super_id)
                    ),
                ));
            }
        }

        if !ctx.config.allow_multiple_cascaded_validation_on_return_values && is_return_value_cascaded(method) {
            for (super_id, _) in overridden.iter().filter(|(_, m)| is_return_value_cascaded(m)) {
                diagnostics.push(Diagnostic::error(
                    type_def.name.as_str(),
                    signature.to_string(),
                    format!(
                        "return value is already marked for cascaded validation by {}",
                        type_name(ctx, *super_id)
                    ),
                ));
            }
        }
    }

    if !ctx.config.allow_parallel_methods_define_parameter_constraints {
        check_parallel(ctx, type_def, diagnostics);
    }
}

/// A method reaching a type through parallel supertypes must not have
/// parameter constraints anywhere. Reported on the type joining the
/// parallel declarations, not on its subtypes.
fn check_parallel(ctx: &Context<'_>, type_def: &TypeDef, diagnostics: &mut Diagnostics) {
    let mut declarations: BTreeMap<Signature, Vec<(TypeId, &MethodDef)>> = BTreeMap::new();
    for id in ctx.types.hierarchy(type_def.id) {
        let Some(declaring) = ctx.types.get_type(id) else {
            continue;
        };
        for method in declaring.methods.iter().filter(|m| !m.is_private()) {
            declarations.entry(method.signature()).or_default().push((id, method));
        }
    }

    let parents: Vec<Vec<TypeId>> = type_def.parent_ids().map(|p| ctx.types.hierarchy(p)).collect();
    for (signature, declared) in &declarations {
        if !declared.iter().any(|(_, m)| has_parameter_constraints(ctx, m)) {
            continue;
        }
        let parallel_to_other =
            |a: &TypeId| declared.iter().any(|(b, _)| a != b && ctx.types.is_parallel(*a, *b));
        let joined_here = declared.iter().enumerate().any(|(i, (a, _))| {
            declared[i + 1..].iter().any(|(b, _)| {
                ctx.types.is_parallel(*a, *b) && !parents.iter().any(|h| h.contains(a) && h.contains(b))
            })
        });
        if !joined_here {
            continue;
        }

        let mut parallel: Vec<String> = declared
            .iter()
            .filter(|(id, _)| parallel_to_other(id))
            .map(|(id, _)| type_name(ctx, *id))
            .collect();
        parallel.sort();
        parallel.dedup();
        diagnostics.push(Diagnostic::error(
            type_def.name.as_str(),
            signature.to_string(),
            format!(
                "is declared by the parallel types {} and must not have parameter constraints",
                parallel.join(", ")
            ),
        ));
    }
}

fn type_name(ctx: &Context<'_>, id: TypeId) -> String {
    ctx.types
        .get_type(id)
        .map(|t| t.name.to_string())
        .unwrap_or_else(|| format!("{:?}", id))
}

#[cfg(test)]
mod tests {
    use crate::ConstraintLinter;
    use beanval_core::Annotation;
    use beanval_descriptor::{builtin, ConstraintDefinitions};
    use beanval_metadata::MethodValidationConfig;
    use beanval_types::{MethodDef, ParameterDef, TypeRegistry, TypeRegistryBuilder, ValueType};
    use pretty_assertions::assert_eq;

    fn method(constrained: bool) -> MethodDef {
        let parameter = ParameterDef::new("s", ValueType::named("String"));
        let parameter = if constrained {
            parameter.annotate(builtin::not_null())
        } else {
            parameter
        };
        MethodDef::new("m").param(parameter).returns(ValueType::named("String"))
    }

    fn messages(types: &TypeRegistry, config: MethodValidationConfig) -> Vec<String> {
        let definitions = ConstraintDefinitions::with_builtins();
        ConstraintLinter::new(types, &definitions)
            .with_method_validation(config)
            .lint()
            .into_iter()
            .map(|d| d.to_string())
            .collect()
    }

    // ========== TEST: overriding_method_adds_parameter_constraint ==========
    #[test]
    fn test_overriding_method_adds_parameter_constraint() {
        // GIVEN Sub overriding Base.m with a constrained parameter
        let mut builder = TypeRegistryBuilder::new();
        builder.add_class("Base").method(method(false)).done().unwrap();
        builder.add_class("Sub").extends("Base").method(method(true)).done().unwrap();
        let types = builder.build();

        // WHEN linting, strictly and relaxed
        let strict = messages(&types, MethodValidationConfig::default());
        let relaxed = messages(
            &types,
            MethodValidationConfig::default().with_overriding_method_alter_parameter_constraint(true),
        );

        // THEN only the strict run reports the override
        assert_eq!(
            strict,
            vec![
                "error: Sub.m(String): overrides the method declared by Base and must not alter its parameter constraints"
                    .to_string()
            ]
        );
        assert!(relaxed.is_empty());
    }

    // ========== TEST: parallel_methods_with_parameter_constraints ==========
    #[test]
    fn test_parallel_methods_with_parameter_constraints() {
        // GIVEN Impl implementing I1 and I2, where only I1 constrains m
        let mut builder = TypeRegistryBuilder::new();
        builder.add_interface("I1").method(method(true)).done().unwrap();
        builder.add_interface("I2").method(method(false)).done().unwrap();
        builder.add_class("Impl").implements("I1").implements("I2").method(method(false)).done().unwrap();
        builder.add_class("SubImpl").extends("Impl").done().unwrap();
        let types = builder.build();

        let found = messages(&types, MethodValidationConfig::default());

        // THEN it is reported once, on the joining type
        assert_eq!(
            found,
            vec!["error: Impl.m(String): is declared by the parallel types I1, I2 and must not have parameter constraints"
                .to_string()]
        );
    }

    // ========== TEST: return_value_cascaded_twice ==========
    #[test]
    fn test_return_value_cascaded_twice() {
        let mut builder = TypeRegistryBuilder::new();
        builder
            .add_class("Base")
            .method(method(false).annotate(Annotation::valid()))
            .done()
            .unwrap();
        builder
            .add_class("Sub")
            .extends("Base")
            .method(method(false).annotate(Annotation::valid()))
            .done()
            .unwrap();
        let types = builder.build();

        let strict = messages(&types, MethodValidationConfig::default());
        let relaxed = messages(
            &types,
            MethodValidationConfig::default().with_multiple_cascaded_validation_on_return_values(true),
        );

        assert_eq!(strict.len(), 1);
        assert!(strict[0].contains("already marked for cascaded validation by Base"));
        assert!(relaxed.is_empty());
    }

    #[test]
    fn test_return_value_constraints_may_accumulate() {
        let mut builder = TypeRegistryBuilder::new();
        builder
            .add_class("Base")
            .method(method(false).annotate(builtin::not_null()))
            .done()
            .unwrap();
        builder
            .add_class("Sub")
            .extends("Base")
            .method(method(false).annotate(builtin::size(1, 5)))
            .done()
            .unwrap();

        assert!(messages(&builder.build(), MethodValidationConfig::default()).is_empty());
    }
}
