//! The linter and the metadata builder agree on broken declarations.

use beanval_lint::ConstraintLinter;
use beanval_tests::fixtures;
use beanval_tests::prelude::*;
use pretty_assertions::assert_eq;

fn lint(types: &TypeRegistry) -> Vec<String> {
    let definitions = ConstraintDefinitions::with_builtins();
    ConstraintLinter::new(types, &definitions)
        .lint()
        .into_iter()
        .map(|d| d.to_string())
        .collect()
}

// ========== TEST: fixtures_are_clean ==========
#[test]
fn test_fixtures_are_clean() {
    for types in [
        fixtures::shop(),
        fixtures::shop_with_conversion(),
        fixtures::shop_with_default_sequence(),
        fixtures::people(),
        fixtures::plain(),
        fixtures::library(),
    ] {
        assert_eq!(lint(&types), Vec::<String>::new());
    }
}

// ========== TEST: lint_finds_what_metadata_rejects ==========
#[test]
fn test_lint_finds_what_metadata_rejects() {
    // GIVEN an implementation adding a parameter constraint and a class
    // whose default sequence omits itself
    let send = |constrained: bool| {
        let parameter = ParameterDef::new("address", ValueType::named("String"));
        let parameter = if constrained {
            parameter.annotate(builtin::not_null())
        } else {
            parameter
        };
        MethodDef::new("send").param(parameter)
    };
    let mut builder = TypeRegistryBuilder::new();
    builder.add_interface("com.acme.Shipper").method(send(false)).done().unwrap();
    builder
        .add_class("com.acme.ParcelShipper")
        .implements("com.acme.Shipper")
        .method(send(true))
        .done()
        .unwrap();
    builder
        .add_class("com.acme.Invoice")
        .annotate(Annotation::group_sequence(["com.acme.Shipper"]))
        .done()
        .unwrap();
    let types = builder.build();

    // WHEN linting and building metadata
    let found = lint(&types);
    let factory = ValidatorFactory::builder(types).build().unwrap();

    // THEN every lint error is also a metadata error
    assert_eq!(
        found,
        vec![
            "error: com.acme.Invoice.<type>: default group sequence must contain com.acme.Invoice".to_string(),
            "error: com.acme.ParcelShipper.send(String): overrides the method declared by com.acme.Shipper and must not alter its parameter constraints".to_string(),
        ]
    );
    assert!(factory.bean_meta_data("com.acme.Invoice").is_err());
    assert!(factory.bean_meta_data("com.acme.ParcelShipper").is_err());
    assert!(factory.bean_meta_data("com.acme.Shipper").is_ok());
}

// ========== TEST: diamond_with_constrained_top_method ==========
#[test]
fn test_diamond_with_constrained_top_method() {
    // GIVEN Carrier.send(@NotNull String), redeclared without constraints by
    // two carriers that a single courier implements
    let send = |constrained: bool| {
        let parameter = ParameterDef::new("address", ValueType::named("String"));
        let parameter = if constrained {
            parameter.annotate(builtin::not_null())
        } else {
            parameter
        };
        MethodDef::new("send").param(parameter)
    };
    let mut builder = TypeRegistryBuilder::new();
    builder.add_interface("com.acme.Carrier").method(send(true)).done().unwrap();
    for carrier in ["com.acme.AirCarrier", "com.acme.RoadCarrier"] {
        builder
            .add_interface(carrier)
            .extends("com.acme.Carrier")
            .method(send(false))
            .done()
            .unwrap();
    }
    builder
        .add_class("com.acme.Courier")
        .implements("com.acme.RoadCarrier")
        .implements("com.acme.AirCarrier")
        .done()
        .unwrap();
    let types = builder.build();

    // WHEN linting and building the courier's metadata
    let found = lint(&types);
    let factory = ValidatorFactory::builder(types).build().unwrap();
    let built = factory.bean_meta_data("com.acme.Courier");

    // THEN both name the same pair of parallel carriers
    assert_eq!(
        found,
        vec![
            "error: com.acme.Courier.send(String): is declared by the parallel types com.acme.AirCarrier, com.acme.RoadCarrier and must not have parameter constraints"
                .to_string(),
        ]
    );
    match built {
        Err(ValidationError::MetaData(MetaDataError::ParallelParameterConstraints { types, .. })) => {
            assert_eq!(
                types,
                vec!["com.acme.AirCarrier".to_string(), "com.acme.RoadCarrier".to_string()]
            );
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
    assert!(factory.bean_meta_data("com.acme.AirCarrier").is_ok());
}
