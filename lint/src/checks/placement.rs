//! Where constraints, cascades and group conversions may be declared.

use super::{is_constraint, is_cross_parameter, TYPE_ELEMENT};
use crate::linter::Context;
use crate::{Diagnostic, Diagnostics};
use beanval_core::{names, Annotation, AttributeValue};
use beanval_descriptor::GROUPS;
use beanval_types::{ParameterDef, TypeDef};

pub(crate) fn check(ctx: &Context<'_>, type_def: &TypeDef, diagnostics: &mut Diagnostics) {
    let mut element = Element {
        ctx,
        type_def,
        name: TYPE_ELEMENT.to_string(),
        diagnostics,
    };
    element.check_groups(&type_def.annotations);
    element.forbid_cross_parameter(&type_def.annotations, "a type");

    for property in &type_def.properties {
        element.name = property.name.clone();
        element.check_groups(&property.annotations);
        element.check_groups(&property.element_annotations);
        element.forbid_cross_parameter(&property.annotations, "a property");
        element.check_conversions(&property.annotations);

        let cascaded = property.annotations.iter().any(|a| a.is(names::VALID));
        let target = property.value_type.innermost();
        if cascaded && ctx.types.get_type_by_name(target.as_str()).is_none() {
            element.warn(format!("cascades into {}, which is not a registered type", target));
        }
    }

    for method in &type_def.methods {
        element.name = method.signature().to_string();
        element.check_groups(&method.annotations);
        element.check_groups(&method.return_element_annotations);
        element.check_conversions(&method.annotations);
        if method.return_type.is_none() {
            let constrains_return = method.annotations.iter().any(|a| {
                a.is(names::VALID) || (is_constraint(ctx, a) && !is_cross_parameter(ctx, a))
            }) || !method.return_element_annotations.is_empty();
            if constrains_return {
                element.error("void methods must not be constrained or cascaded on their return value".to_string());
            }
        }
        let signature = element.name.clone();
        element.check_parameters(&signature, &method.parameters);
    }

    for constructor in &type_def.constructors {
        element.name = constructor.signature(&type_def.name).to_string();
        element.check_groups(&constructor.annotations);
        element.check_conversions(&constructor.annotations);
        let signature = element.name.clone();
        element.check_parameters(&signature, &constructor.parameters);
    }
}

/// The member currently being checked.
struct Element<'c, 'd> {
    ctx: &'c Context<'c>,
    type_def: &'c TypeDef,
    name: String,
    diagnostics: &'d mut Diagnostics,
}

impl Element<'_, '_> {
    fn error(&mut self, message: String) {
        self.diagnostics
            .push(Diagnostic::error(self.type_def.name.as_str(), self.name.clone(), message));
    }

    fn warn(&mut self, message: String) {
        self.diagnostics
            .push(Diagnostic::warning(self.type_def.name.as_str(), self.name.clone(), message));
    }

    /// Every group a constraint names must be a registered interface.
    fn check_groups(&mut self, annotations: &[Annotation]) {
        for annotation in annotations.iter().filter(|a| is_constraint(self.ctx, a)) {
            let groups = annotation
                .attribute(GROUPS)
                .and_then(AttributeValue::as_types)
                .unwrap_or(&[]);
            for group in groups.iter().filter(|g| !g.is_default_group()) {
                if self.ctx.types.get_type_by_name(group.as_str()).is_none() {
                    self.error(format!("{} names the unknown group {}", annotation, group));
                } else if !self.ctx.types.is_interface(group) {
                    self.error(format!("{} names {} as a group, which is not an interface", annotation, group));
                }
            }
        }
    }

    fn forbid_cross_parameter(&mut self, annotations: &[Annotation], place: &str) {
        for annotation in annotations.iter().filter(|a| is_cross_parameter(self.ctx, a)) {
            self.error(format!("cross-parameter constraint {} cannot be declared on {}", annotation, place));
        }
    }

    fn check_conversions(&mut self, annotations: &[Annotation]) {
        let cascaded = annotations.iter().any(|a| a.is(names::VALID));
        if !cascaded && annotations.iter().any(|a| a.is(names::CONVERT_GROUP)) {
            self.error("group conversions require cascaded validation".to_string());
        }
    }

    fn check_parameters(&mut self, signature: &str, parameters: &[ParameterDef]) {
        for parameter in parameters {
            self.name = format!("{}#{}", signature, parameter.name);
            self.check_groups(&parameter.annotations);
            self.check_groups(&parameter.element_annotations);
            self.forbid_cross_parameter(&parameter.annotations, "a parameter");
            self.check_conversions(&parameter.annotations);
        }
        self.name = signature.to_string();
    }
}
