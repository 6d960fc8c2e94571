//! Group sequences and default group sequence providers.

use super::TYPE_ELEMENT;
use crate::linter::Context;
use crate::{Diagnostic, Diagnostics};
use beanval_core::{names, AttributeValue, TypeName};
use beanval_types::TypeDef;

pub(crate) fn check(ctx: &Context<'_>, type_def: &TypeDef, diagnostics: &mut Diagnostics) {
    let mut report = |message: String| {
        diagnostics.push(Diagnostic::error(type_def.name.as_str(), TYPE_ELEMENT, message));
    };

    let sequence = type_def.annotation(names::GROUP_SEQUENCE);
    if let Some(groups) = sequence.map(sequence_members) {
        if type_def.is_interface() {
            for group in groups.iter().filter(|g| !ctx.types.is_interface(g)) {
                report(format!("group sequence lists {}, which is not an interface", group));
            }
            if let Some(cycle) = find_cycle(ctx, &type_def.name) {
                let cycle: Vec<String> = cycle.iter().map(ToString::to_string).collect();
                report(format!("group sequence is cyclic: {}", cycle.join(" -> ")));
            }
        } else {
            if groups.iter().any(TypeName::is_default_group) {
                report("default group sequence must not contain the Default group".to_string());
            }
            if !groups.contains(&type_def.name) {
                report(format!("default group sequence must contain {}", type_def.name));
            }
            let others = groups
                .iter()
                .filter(|g| **g != type_def.name && !g.is_default_group() && !ctx.types.is_interface(g));
            for group in others {
                report(format!("group sequence lists {}, which is not an interface", group));
            }
        }
    }

    if type_def.annotation(names::GROUP_SEQUENCE_PROVIDER).is_some() {
        if type_def.is_interface() {
            report("a default group sequence provider cannot be declared on an interface".to_string());
        } else if sequence.is_some() {
            report("declares both a default group sequence and a default group sequence provider".to_string());
        }
    }
}

fn sequence_members(annotation: &beanval_core::Annotation) -> &[TypeName] {
    annotation
        .attribute("value")
        .and_then(AttributeValue::as_types)
        .unwrap_or(&[])
}

/// Follows sequence members that are sequences themselves and returns the
/// first path leading back to `start`. Cycles not passing through `start`
/// are left to the interfaces on them.
fn find_cycle(ctx: &Context<'_>, start: &TypeName) -> Option<Vec<TypeName>> {
    let mut path = vec![start.clone()];
    if visit(ctx, start, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn visit(ctx: &Context<'_>, current: &TypeName, path: &mut Vec<TypeName>) -> bool {
    let Some(annotation) = ctx
        .types
        .get_type_by_name(current.as_str())
        .and_then(|t| t.annotation(names::GROUP_SEQUENCE))
    else {
        return false;
    };
    for member in sequence_members(annotation) {
        if member == &path[0] {
            path.push(member.clone());
            return true;
        }
        if path.contains(member) {
            continue;
        }
        path.push(member.clone());
        if visit(ctx, member, path) {
            return true;
        }
        path.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use crate::{ConstraintLinter, Diagnostics};
    use beanval_core::{names, Annotation};
    use beanval_descriptor::ConstraintDefinitions;
    use beanval_types::TypeRegistryBuilder;
    use pretty_assertions::assert_eq;

    fn lint(builder: TypeRegistryBuilder) -> Diagnostics {
        let types = builder.build();
        let definitions = ConstraintDefinitions::with_builtins();
        ConstraintLinter::new(&types, &definitions).lint()
    }

    fn messages(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics.all().iter().map(|d| d.message.clone()).collect()
    }

    // ========== TEST: class_sequence_must_contain_the_class ==========
    #[test]
    fn test_class_sequence_must_contain_the_class() {
        // GIVEN a class whose default sequence names Default instead of itself
        let mut builder = TypeRegistryBuilder::new();
        builder.add_interface("Extended").done().unwrap();
        builder
            .add_class("Order")
            .annotate(Annotation::group_sequence([names::DEFAULT_GROUP, "Extended"]))
            .done()
            .unwrap();

        // WHEN linting
        let diagnostics = lint(builder);

        // THEN both problems are reported on the type
        assert_eq!(
            messages(&diagnostics),
            vec![
                "default group sequence must not contain the Default group".to_string(),
                "default group sequence must contain Order".to_string(),
            ]
        );
        assert_eq!(diagnostics.all()[0].element, "<type>");
    }

    #[test]
    fn test_valid_class_sequence() {
        let mut builder = TypeRegistryBuilder::new();
        builder.add_interface("Extended").done().unwrap();
        builder
            .add_class("Order")
            .annotate(Annotation::group_sequence(["Order", "Extended"]))
            .done()
            .unwrap();

        assert!(lint(builder).is_empty());
    }

    // ========== TEST: cyclic_interface_sequences ==========
    #[test]
    fn test_cyclic_interface_sequences() {
        // GIVEN A -> B -> A
        let mut builder = TypeRegistryBuilder::new();
        builder
            .add_interface("A")
            .annotate(Annotation::group_sequence(["B"]))
            .done()
            .unwrap();
        builder
            .add_interface("B")
            .annotate(Annotation::group_sequence(["A"]))
            .done()
            .unwrap();

        let diagnostics = lint(builder);

        // THEN each interface on the cycle reports it from its own position
        assert_eq!(
            messages(&diagnostics),
            vec![
                "group sequence is cyclic: A -> B -> A".to_string(),
                "group sequence is cyclic: B -> A -> B".to_string(),
            ]
        );
    }

    #[test]
    fn test_interface_sequence_lists_class() {
        let mut builder = TypeRegistryBuilder::new();
        builder.add_class("Order").done().unwrap();
        builder
            .add_interface("Checks")
            .annotate(Annotation::group_sequence(["Order", "Missing"]))
            .done()
            .unwrap();

        assert_eq!(
            messages(&lint(builder)),
            vec![
                "group sequence lists Order, which is not an interface".to_string(),
                "group sequence lists Missing, which is not an interface".to_string(),
            ]
        );
    }

    // ========== TEST: misplaced_sequence_providers ==========
    #[test]
    fn test_misplaced_sequence_providers() {
        // GIVEN a provider on an interface and one next to a static sequence
        let mut builder = TypeRegistryBuilder::new();
        builder
            .add_interface("Checks")
            .annotate(Annotation::group_sequence_provider("checks"))
            .done()
            .unwrap();
        builder
            .add_class("Order")
            .annotate(Annotation::group_sequence(["Order"]))
            .annotate(Annotation::group_sequence_provider("orders"))
            .done()
            .unwrap();

        let diagnostics = lint(builder);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.for_type("Checks").next().map(|d| d.message.as_str()),
            Some("a default group sequence provider cannot be declared on an interface")
        );
        assert_eq!(
            diagnostics.for_type("Order").next().map(|d| d.message.as_str()),
            Some("declares both a default group sequence and a default group sequence provider")
        );
    }
}
