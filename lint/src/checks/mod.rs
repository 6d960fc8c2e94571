//! The individual checks.
//!
//! - `overrides` - Parameter and return value rules for overridden and parallel methods
//! - `sequences` - Group sequences and default group sequence providers
//! - `placement` - Where constraints, cascades and group conversions may be declared

pub(crate) mod overrides;
pub(crate) mod placement;
pub(crate) mod sequences;

use crate::linter::Context;
use beanval_core::{names, Annotation};
use beanval_descriptor::VALIDATION_APPLIES_TO;
use beanval_types::{MethodDef, ParameterDef};

/// Element name used for diagnostics on the type itself.
pub(crate) const TYPE_ELEMENT: &str = "<type>";

fn is_constraint(ctx: &Context<'_>, annotation: &Annotation) -> bool {
    ctx.definitions.is_constraint(&annotation.name)
}

/// Returns true if the annotation declares a cross-parameter constraint:
/// its definition validates parameter arrays only, or it asks for that
/// target explicitly.
fn is_cross_parameter(ctx: &Context<'_>, annotation: &Annotation) -> bool {
    let Some(definition) = ctx.definitions.get(&annotation.name) else {
        return false;
    };
    if !definition.supports_cross_parameter() {
        return false;
    }
    !definition.supports_generic()
        || annotation
            .attribute(VALIDATION_APPLIES_TO)
            .and_then(|v| v.as_str())
            == Some("PARAMETERS")
}

fn is_parameter_constrained(ctx: &Context<'_>, parameter: &ParameterDef) -> bool {
    parameter
        .annotations
        .iter()
        .any(|a| a.is(names::VALID) || is_constraint(ctx, a))
        || parameter.element_annotations.iter().any(|a| is_constraint(ctx, a))
}

/// Cross-parameter constraints do not count as parameter constraints.
fn has_parameter_constraints(ctx: &Context<'_>, method: &MethodDef) -> bool {
    method.parameters.iter().any(|p| is_parameter_constrained(ctx, p))
}

fn is_return_value_cascaded(method: &MethodDef) -> bool {
    method.annotations.iter().any(|a| a.is(names::VALID))
}
