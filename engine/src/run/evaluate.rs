//! Evaluation of one constraint, composing constraints included.

use crate::constraint::{ConstraintValidatorContext, ConstraintValidatorFactory};
use crate::{ValidationError, ValidationResult};
use beanval_core::{Path, Value};
use beanval_descriptor::{CompositionType, ConstraintDescriptor};
use std::sync::Arc;

/// A violation found by a validator, before interpolation and before its
/// final path is known.
#[derive(Debug, Clone)]
pub(crate) struct Pending {
    pub descriptor: Arc<ConstraintDescriptor>,
    pub template: String,
    /// Custom property nodes added by the validator.
    pub property_nodes: Vec<String>,
}

impl Pending {
    fn default_for(descriptor: &Arc<ConstraintDescriptor>) -> Self {
        Self {
            descriptor: Arc::clone(descriptor),
            template: descriptor.message_template().to_string(),
            property_nodes: Vec::new(),
        }
    }
}

/// Evaluate a constraint against a value.
///
/// Composing constraints are evaluated first and combined according to
/// the composition type:
/// - `And`: every failure is reported, or only the composed constraint's
///   own violation when it reports as a single violation
/// - `Or`: failures are reported only if every composing constraint failed
/// - `AllFalse`: a single violation unless every composing constraint failed
///
/// The constraint's own validator, if one is registered, is evaluated
/// unless a single-violation `And` composition already failed.
pub(crate) fn evaluate(
    validators: &ConstraintValidatorFactory,
    descriptor: &Arc<ConstraintDescriptor>,
    value: &Value,
    path: &Path,
) -> ValidationResult<Vec<Pending>> {
    let composing = descriptor.composing_constraints();
    let single = descriptor.is_report_as_single_violation();
    let composition = descriptor.composition();

    let mut failed = 0;
    let mut composing_violations = Vec::new();
    for child in composing {
        let violations = evaluate(validators, child, value, path)?;
        if !violations.is_empty() {
            failed += 1;
            composing_violations.extend(violations);
        }
    }

    if composition == CompositionType::And && single && failed > 0 {
        return Ok(vec![Pending::default_for(descriptor)]);
    }

    let own = evaluate_own(validators, descriptor, value, path)?;

    let mut violations = match composition {
        CompositionType::And => composing_violations,
        CompositionType::Or if failed < composing.len() => Vec::new(),
        CompositionType::Or => composing_violations,
        CompositionType::AllFalse if failed == composing.len() => Vec::new(),
        CompositionType::AllFalse => vec![Pending::default_for(descriptor)],
    };
    violations.extend(own);

    if single && !violations.is_empty() {
        return Ok(vec![Pending::default_for(descriptor)]);
    }
    Ok(violations)
}

fn evaluate_own(
    validators: &ConstraintValidatorFactory,
    descriptor: &Arc<ConstraintDescriptor>,
    value: &Value,
    path: &Path,
) -> ValidationResult<Vec<Pending>> {
    let failed = |reason: String| ValidationError::validator_failed(descriptor.definition().as_str(), path.to_string(), reason);

    let validator = validators.validator_for(descriptor).map_err(|e| failed(e.0))?;
    let Some(validator) = validator else {
        if descriptor.is_composed() {
            return Ok(Vec::new());
        }
        return Err(ValidationError::no_validator(descriptor.definition().as_str(), value.type_name()));
    };
    if !value.is_null() && !validator.supports(value) {
        return Err(ValidationError::no_validator(descriptor.definition().as_str(), value.type_name()));
    }

    let mut context = ConstraintValidatorContext::new(descriptor.as_ref());
    if validator.is_valid(value, &mut context).map_err(|e| failed(e.0))? {
        return Ok(Vec::new());
    }

    let default_disabled = context.is_default_disabled();
    let mut violations: Vec<Pending> = Vec::new();
    if !default_disabled {
        violations.push(Pending::default_for(descriptor));
    }
    violations.extend(context.into_custom().into_iter().map(|custom| Pending {
        descriptor: Arc::clone(descriptor),
        template: custom.message_template,
        property_nodes: custom.property_nodes,
    }));

    if violations.is_empty() {
        return Err(failed(
            "the default violation was disabled but no custom violation was added".to_string(),
        ));
    }
    Ok(violations)
}
