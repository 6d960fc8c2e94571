//! Shop integration tests.
//!
//! Orders with a cascaded customer, validated through groups, sequences,
//! group conversion and method validation.

use beanval_tests::fixtures::{self, CHECKS, CUSTOMER, EXTENDED, ORDER};
use beanval_tests::prelude::*;

mod anonymous_customer {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("anonymous_customer", fixtures::shop())
            .step(
                "order_without_id_and_customer_name",
                |v| v.validate(&fixtures::order(Value::Null, fixtures::customer(Value::Null)), &[]),
                |a| {
                    a.count(2)
                        .paths(["id", "customer.name"])
                        .message("id", "must not be null")
                        .message("customer.name", "must not be null")
                },
            )
            .step(
                "complete_order",
                |v| v.validate(&fixtures::order("o-1", fixtures::customer("Ada")), &[]),
                |a| a.valid(),
            )
            .step(
                "missing_customer_is_not_cascaded",
                |v| v.validate(&fixtures::order("o-1", Value::Null), &[]),
                |a| a.valid(),
            )
            // Customer.email only belongs to Full
            .step(
                "email_is_not_in_default",
                |v| v.validate(&fixtures::order("o-1", fixtures::customer("Ada")), &[TypeName::default_group()]),
                |a| a.not_at("customer.email").valid(),
            )
    }

    #[test]
    fn test_order_with_anonymous_customer() {
        scenario().run().unwrap();
    }
}

mod groups_and_sequences {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("groups_and_sequences", fixtures::shop())
            .step(
                "extended_only",
                |v| v.validate(&fixtures::order_with_note(Value::Null, "far too long"), &[EXTENDED.into()]),
                |a| a.paths(["note"]),
            )
            .step(
                "default_and_extended",
                |v| {
                    v.validate(
                        &fixtures::order_with_note(Value::Null, "far too long"),
                        &[TypeName::default_group(), EXTENDED.into()],
                    )
                },
                |a| a.paths(["id", "note"]),
            )
            // The sequence stops after the failing Default step
            .step(
                "sequence_stops_at_first_failing_step",
                |v| v.validate(&fixtures::order_with_note(Value::Null, "far too long"), &[CHECKS.into()]),
                |a| a.paths(["id"]),
            )
            .step(
                "sequence_reaches_second_step",
                |v| v.validate(&fixtures::order_with_note("o-1", "far too long"), &[CHECKS.into()]),
                |a| a.paths(["note"]),
            )
            .step(
                "unknown_group",
                |v| v.validate(&fixtures::order("o-1", Value::Null), &["com.acme.groups.Missing".into()]),
                |a| a.error("com.acme.groups.Missing"),
            )
    }

    #[test]
    fn test_groups_and_sequences() {
        scenario().run().unwrap();
    }
}

mod redefined_default_sequence {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("redefined_default_sequence", fixtures::shop_with_default_sequence())
            .step(
                "default_stops_after_order_group",
                |v| v.validate(&fixtures::order_with_note(Value::Null, "far too long"), &[]),
                |a| a.paths(["id"]),
            )
            .step(
                "default_reaches_extended",
                |v| v.validate(&fixtures::order_with_note("o-1", "far too long"), &[]),
                |a| a.paths(["note"]),
            )
    }

    #[test]
    fn test_redefined_default_sequence() {
        scenario().run().unwrap();
    }
}

mod group_conversion {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("group_conversion", fixtures::shop_with_conversion()).step(
            "customer_validated_as_full",
            |v| v.validate(&fixtures::order("o-1", fixtures::customer(Value::Null)), &[]),
            // name is a Default constraint, email a Full one
            |a| a.paths(["customer.email"]),
        )
    }

    #[test]
    fn test_default_converted_to_full() {
        scenario().run().unwrap();
    }
}

mod fail_fast {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("fail_fast", fixtures::shop())
            .configure(|builder| builder.fail_fast(true))
            .step(
                "first_violation_only",
                |v| v.validate(&fixtures::order(Value::Null, fixtures::customer(Value::Null)), &[]),
                |a| a.count(1),
            )
    }

    #[test]
    fn test_fail_fast_stops_at_first_violation() {
        scenario().run().unwrap();
    }
}

mod properties_and_values {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("properties_and_values", fixtures::shop())
            .step(
                "nested_property",
                |v| v.validate_property(&fixtures::order("o-1", fixtures::customer(Value::Null)), "customer.name", &[]),
                |a| a.paths(["customer.name"]),
            )
            .step(
                "property_is_not_cascaded",
                |v| v.validate_property(&fixtures::order("o-1", fixtures::customer(Value::Null)), "customer", &[]),
                |a| a.valid(),
            )
            .step(
                "value_of_nested_property",
                |v| v.validate_value(&ORDER.into(), "customer.name", Value::Null, &[]),
                |a| a.paths(["customer.name"]),
            )
            .step(
                "value_on_customer",
                |v| v.validate_value(&CUSTOMER.into(), "name", "Ada".into(), &[]),
                |a| a.valid(),
            )
            .step(
                "unknown_property",
                |v| v.validate_property(&fixtures::order("o-1", Value::Null), "total", &[]),
                |a| a.error("total"),
            )
    }

    #[test]
    fn test_properties_and_values() {
        scenario().run().unwrap();
    }
}

mod method_validation {
    use super::*;

    fn ship() -> Signature {
        Signature::new("ship", ["int"])
    }

    pub fn scenario() -> Scenario {
        Scenario::new("method_validation", fixtures::shop())
            .step(
                "too_many_days",
                |v| v.validate_parameters(&fixtures::order("o-1", Value::Null), &ship(), &[Value::from(45)], &[]),
                |a| a.paths(["ship.days"]),
            )
            .step(
                "allowed_days",
                |v| v.validate_parameters(&fixtures::order("o-1", Value::Null), &ship(), &[Value::from(3)], &[]),
                |a| a.valid(),
            )
            .step(
                "missing_tracking_number",
                |v| v.validate_return_value(&fixtures::order("o-1", Value::Null), &ship(), &Value::Null, &[]),
                |a| a.paths(["ship.<return value>"]),
            )
            .step(
                "wrong_arity",
                |v| v.validate_parameters(&fixtures::order("o-1", Value::Null), &ship(), &[], &[]),
                |a| a.error("expects 1 arguments, got 0"),
            )
    }

    #[test]
    fn test_method_validation() {
        scenario().run().unwrap();
    }
}

mod dynamic_default_sequence {
    use super::*;
    use beanval_tests::fixtures::DOC_SEQUENCE;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub fn scenario(calls: Arc<AtomicUsize>) -> Scenario {
        let shared = fixtures::doc("Shared", "far too long", false);
        Scenario::new("dynamic_default_sequence", fixtures::library())
            .configure(move |builder| {
                let calls = Arc::clone(&calls);
                builder.sequence_provider(DOC_SEQUENCE, move |bean: Option<&BeanRef>| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    fixtures::doc_sequence(bean)
                })
            })
            // Extended fails first, so the titles are never checked
            .step(
                "sequence_stops_in_each_doc",
                |v| {
                    let docs = [
                        fixtures::doc(Value::Null, "far too long", false),
                        fixtures::doc(Value::Null, "far too long", false),
                    ];
                    v.validate(&fixtures::library_of(docs), &[])
                },
                |a| a.paths(["docs[0].note", "docs[1].note"]),
            )
            .step(
                "sequence_follows_each_instance",
                |v| {
                    let docs = [
                        fixtures::doc(Value::Null, "far too long", true),
                        fixtures::doc("Manual", "far too long", false),
                    ];
                    v.validate(&fixtures::library_of(docs), &[])
                },
                |a| a.paths(["docs[0].title", "docs[1].note"]),
            )
            .step(
                "same_instance_listed_twice",
                move |v| v.validate(&fixtures::library_of([shared.clone(), shared.clone()]), &[]),
                |a| a.at("docs[0].note").not_at("docs[0].title"),
            )
            // Explicit groups skip the default sequence but still check it expands
            .step(
                "explicit_group",
                |v| {
                    let docs = [fixtures::doc(Value::Null, "far too long", false)];
                    v.validate(&fixtures::library_of(docs), &[EXTENDED.into()])
                },
                |a| a.paths(["docs[0].note"]),
            )
    }

    // ========== TEST: provider_asked_once_per_instance_and_call ==========
    #[test]
    fn test_provider_asked_once_per_instance_and_call() {
        // GIVEN a provider counting its calls
        let calls = Arc::new(AtomicUsize::new(0));

        // WHEN running all steps
        scenario(Arc::clone(&calls)).run().unwrap();

        // THEN each doc was asked for once per call, the shared one once
        assert_eq!(calls.load(Ordering::SeqCst), 2 + 2 + 1 + 1);
    }
}
