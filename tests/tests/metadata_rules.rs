//! Metadata integration tests: override rules, sequences, caching.

use std::sync::Arc;

use beanval_tests::fixtures::{self, ORDER};
use beanval_tests::prelude::*;
use pretty_assertions::assert_eq;

const SHIPPER: &str = "com.acme.Shipper";
const PARCEL_SHIPPER: &str = "com.acme.ParcelShipper";

fn send(constrained: bool) -> MethodDef {
    let parameter = ParameterDef::new("address", ValueType::named("String"));
    let parameter = if constrained {
        parameter.annotate(builtin::not_null())
    } else {
        parameter
    };
    MethodDef::new("send").param(parameter).returns(ValueType::named("String"))
}

fn factory(types: TypeRegistry) -> ValidatorFactory {
    init_tracing();
    ValidatorFactory::builder(types).build().unwrap()
}

// ========== TEST: overriding_method_must_not_redeclare_parameter_constraints ==========
#[test]
fn test_overriding_method_must_not_redeclare_parameter_constraints() {
    // GIVEN an interface method with a constrained parameter and an
    // implementation declaring the same constraint again
    let mut builder = TypeRegistryBuilder::new();
    builder.add_interface(SHIPPER).method(send(true)).done().unwrap();
    builder
        .add_class(PARCEL_SHIPPER)
        .implements(SHIPPER)
        .method(send(true))
        .done()
        .unwrap();
    let factory = factory(builder.build());

    // WHEN building the implementation's metadata
    let err = factory.bean_meta_data(PARCEL_SHIPPER).unwrap_err();

    // THEN both declaring types are named
    match err {
        ValidationError::MetaData(MetaDataError::ParameterConstraintsAltered {
            declaring_type,
            overridden,
            ..
        }) => {
            assert_eq!(declaring_type, PARCEL_SHIPPER);
            assert_eq!(overridden, SHIPPER);
        }
        other => panic!("unexpected error: {}", other),
    }

    // AND the interface on its own is fine
    assert!(factory.bean_meta_data(SHIPPER).is_ok());
}

#[test]
fn test_relaxed_override_rule() {
    let mut builder = TypeRegistryBuilder::new();
    builder.add_interface(SHIPPER).method(send(false)).done().unwrap();
    builder
        .add_class(PARCEL_SHIPPER)
        .implements(SHIPPER)
        .method(send(true))
        .done()
        .unwrap();
    let config = ValidatorConfig::new().with_method_validation(
        MethodValidationConfig::default().with_overriding_method_alter_parameter_constraint(true),
    );
    let factory = ValidatorFactory::builder(builder.build()).config(config).build().unwrap();

    let meta = factory.bean_meta_data(PARCEL_SHIPPER).unwrap();

    let send = meta.executable(&Signature::new("send", ["String"])).unwrap();
    assert_eq!(send.parameters()[0].constraints().len(), 1);
}

// ========== TEST: parallel_methods_must_not_define_parameter_constraints ==========
#[test]
fn test_parallel_methods_must_not_define_parameter_constraints() {
    // GIVEN two unrelated interfaces declaring send(@NotNull String)
    let mut builder = TypeRegistryBuilder::new();
    builder.add_interface("com.acme.I2").method(send(true)).done().unwrap();
    builder.add_interface("com.acme.I1").method(send(true)).done().unwrap();
    builder
        .add_class("com.acme.Both")
        .implements("com.acme.I2")
        .implements("com.acme.I1")
        .method(send(false))
        .done()
        .unwrap();
    let factory = factory(builder.build());

    // WHEN building the implementing class
    let err = factory.bean_meta_data("com.acme.Both").unwrap_err();

    // THEN the error lists both interfaces, sorted
    match err {
        ValidationError::MetaData(MetaDataError::ParallelParameterConstraints { types, .. }) => {
            assert_eq!(types, vec!["com.acme.I1".to_string(), "com.acme.I2".to_string()]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ========== TEST: return_value_constraints_accumulate ==========
#[test]
fn test_return_value_constraints_accumulate() {
    // GIVEN bar() returning @NotNull and an override adding @Size
    let bar = || MethodDef::new("bar").returns(ValueType::named("String"));
    let mut builder = TypeRegistryBuilder::new();
    builder
        .add_class("com.acme.Base")
        .method(bar().annotate(builtin::not_null()))
        .done()
        .unwrap();
    builder
        .add_class("com.acme.Sub")
        .extends("com.acme.Base")
        .method(bar().annotate(builtin::size(1, 5)))
        .done()
        .unwrap();
    let factory = factory(builder.build());

    // WHEN reading the override's metadata
    let meta = factory.bean_meta_data("com.acme.Sub").unwrap();
    let bar = meta.executable(&Signature::new("bar", Vec::<String>::new())).unwrap();

    // THEN it carries the union of both declarations and no cascade
    assert_eq!(bar.return_value_constraints().len(), 2);
    assert!(!bar.return_cascading().is_cascading());
}

// ========== TEST: default_sequence_must_contain_the_class ==========
#[test]
fn test_default_sequence_must_contain_the_class() {
    let mut builder = TypeRegistryBuilder::new();
    builder.add_interface("com.acme.Other").done().unwrap();
    builder
        .add_class("com.acme.Invoice")
        .annotate(Annotation::group_sequence(["com.acme.Other"]))
        .property(PropertyDef::new("number", ValueType::named("String")).annotate(builtin::not_null()))
        .done()
        .unwrap();
    let factory = factory(builder.build());

    let err = factory.bean_meta_data("com.acme.Invoice").unwrap_err();

    assert!(matches!(
        err,
        ValidationError::MetaData(MetaDataError::BeanClassNotInSequence { .. })
    ));
}

// ========== TEST: static_sequence_and_provider_are_exclusive ==========
#[test]
fn test_static_sequence_and_provider_are_exclusive() {
    // GIVEN a class declaring a default sequence and a sequence provider
    let mut builder = TypeRegistryBuilder::new();
    builder
        .add_class("com.acme.Memo")
        .annotate(Annotation::group_sequence(["com.acme.Memo"]))
        .annotate(Annotation::group_sequence_provider("memos"))
        .property(PropertyDef::new("text", ValueType::named("String")).annotate(builtin::not_null()))
        .done()
        .unwrap();
    init_tracing();
    let factory = ValidatorFactory::builder(builder.build())
        .sequence_provider("memos", |_: Option<&BeanRef>| vec![TypeName::new("com.acme.Memo")])
        .build()
        .unwrap();

    // WHEN building its metadata
    let err = factory.bean_meta_data("com.acme.Memo").unwrap_err();

    // THEN the two sources are rejected together
    assert!(matches!(
        err,
        ValidationError::MetaData(MetaDataError::SequenceAndProvider { ref type_name }) if type_name == "com.acme.Memo"
    ));
}

#[test]
fn test_provided_sequence_must_contain_the_class() {
    let mut builder = TypeRegistryBuilder::new();
    builder.add_interface("com.acme.Other").done().unwrap();
    builder
        .add_class("com.acme.Memo")
        .annotate(Annotation::group_sequence_provider("memos"))
        .property(PropertyDef::new("text", ValueType::named("String")).annotate(builtin::not_null()))
        .done()
        .unwrap();
    init_tracing();
    let factory = ValidatorFactory::builder(builder.build())
        .sequence_provider("memos", |_: Option<&BeanRef>| vec![TypeName::new("com.acme.Other")])
        .build()
        .unwrap();
    let memo = DynamicBean::new("com.acme.Memo").into_ref();

    let err = factory.validator().validate(&memo, &[]).unwrap_err();

    assert!(matches!(
        err,
        ValidationError::MetaData(MetaDataError::BeanClassNotInSequence { .. })
    ));
}

// ========== TEST: cyclic_group_sequences ==========
#[test]
fn test_cyclic_group_sequences() {
    // GIVEN A -> B -> A
    let mut builder = TypeRegistryBuilder::new();
    builder
        .add_interface("com.acme.A")
        .annotate(Annotation::group_sequence(["com.acme.B"]))
        .done()
        .unwrap();
    builder
        .add_interface("com.acme.B")
        .annotate(Annotation::group_sequence(["com.acme.A"]))
        .done()
        .unwrap();
    builder
        .add_class("com.acme.Ticket")
        .property(
            PropertyDef::new("code", ValueType::named("String")).annotate(builtin::not_null().groups(["com.acme.A"])),
        )
        .done()
        .unwrap();
    let factory = factory(builder.build());
    let ticket = DynamicBean::new("com.acme.Ticket").into_ref();

    // WHEN validating with the cyclic group
    let err = factory.validator().validate(&ticket, &["com.acme.A".into()]).unwrap_err();

    // THEN the expansion fails instead of recursing
    assert!(matches!(err, ValidationError::Group(GroupError::CyclicSequence { .. })));
}

// ========== TEST: concurrent_metadata_requests_share_one_instance ==========
#[test]
fn test_concurrent_metadata_requests_share_one_instance() {
    let factory = factory(fixtures::shop());

    let built: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| factory.bean_meta_data(ORDER).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = factory.bean_meta_data(ORDER).unwrap();
    assert!(built.iter().all(|meta| Arc::ptr_eq(meta, &first)));
}

#[test]
fn test_clear_drops_cached_metadata() {
    let factory = factory(fixtures::shop());
    let before = factory.bean_meta_data(ORDER).unwrap();
    assert!(factory.cached_types() > 0);

    factory.clear();

    assert_eq!(factory.cached_types(), 0);
    let after = factory.bean_meta_data(ORDER).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
}

// ========== TEST: unconstrained_hierarchy ==========
#[test]
fn test_unconstrained_hierarchy() {
    let factory = factory(fixtures::plain());
    let validator = factory.validator();
    let bean = fixtures::plain_bean();

    assert!(!validator.is_constrained(fixtures::PLAIN).unwrap());
    assert!(validator.validate(&bean, &[]).unwrap().is_empty());
    assert!(validator
        .validate(&bean, &[TypeName::default_group(), "com.acme.groups.Anything".into()])
        .unwrap()
        .is_empty());
    let rename = Signature::new("rename", ["String"]);
    assert!(validator
        .validate_parameters(&bean, &rename, &[Value::Null], &[])
        .unwrap()
        .is_empty());
}
