//! Traversal integration tests: cyclic graphs and repeated validation.

use beanval_tests::fixtures;
use beanval_tests::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn shop_validator() -> Validator {
    init_tracing();
    ValidatorFactory::builder(fixtures::shop()).build().unwrap().validator()
}

fn name() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z]{1,8}")
}

mod cyclic_partners {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("cyclic_partners", fixtures::people())
            .step(
                "both_names_missing",
                |v| v.validate(&fixtures::partners(Value::Null, Value::Null), &[]),
                // the partner's partner is the root, which is not visited again
                |a| a.paths(["name", "partner.name"]),
            )
            .step(
                "partner_name_missing",
                |v| v.validate(&fixtures::partners("Ada", Value::Null), &[]),
                |a| a.paths(["partner.name"]),
            )
            .step(
                "both_named",
                |v| v.validate(&fixtures::partners("Ada", "Bob"), &[]),
                |a| a.valid(),
            )
    }

    #[test]
    fn test_cyclic_graph_terminates() {
        scenario().run().unwrap();
    }
}

// ========== TEST: self_reference ==========
#[test]
fn test_self_reference() {
    // GIVEN a person who is their own partner
    init_tracing();
    let validator = ValidatorFactory::builder(fixtures::people()).build().unwrap().validator();
    let person = std::sync::Arc::new(DynamicBean::new(fixtures::PERSON));
    person.set("partner", BeanRef::from(std::sync::Arc::clone(&person)));
    let person = BeanRef::from(person);

    // WHEN validating
    let violations = validator.validate(&person, &[]).unwrap();

    // THEN the missing name is reported once
    assert_eq!(violations.paths(), vec!["name".to_string()]);
}

proptest! {
    // ========== TEST: validation_is_idempotent ==========
    #[test]
    fn test_validation_is_idempotent(id in name(), customer_name in name(), with_customer in any::<bool>()) {
        let validator = shop_validator();
        let customer = if with_customer {
            fixtures::customer(customer_name.clone())
        } else {
            Value::Null
        };
        let order = fixtures::order(id.clone(), customer);

        let first = validator.validate(&order, &[TypeName::default_group()]).unwrap();
        let second = validator.validate(&order, &[TypeName::default_group()]).unwrap();

        prop_assert_eq!(first.all(), second.all());
        let expected = usize::from(id.is_none()) + usize::from(with_customer && customer_name.is_none());
        prop_assert_eq!(first.len(), expected);
    }

    // ========== TEST: cyclic_violations_match_first_visits ==========
    #[test]
    fn test_cyclic_violations_match_first_visits(first in name(), second in name()) {
        let validator = ValidatorFactory::builder(fixtures::people()).build().unwrap().validator();
        let root = fixtures::partners(first.clone(), second.clone());

        let violations = validator.validate(&root, &[]).unwrap();

        let mut expected = Vec::new();
        if first.is_none() {
            expected.push("name".to_string());
        }
        if second.is_none() {
            expected.push("partner.name".to_string());
        }
        prop_assert_eq!(violations.paths(), expected);
    }
}
