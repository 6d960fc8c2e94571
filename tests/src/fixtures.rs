//! Bean fixtures shared by the integration tests.
//!
//! - `shop` - orders with a cascaded customer, groups and a redefinable default sequence
//! - `people` - persons referencing each other through a cascaded `partner`
//! - `plain` - a hierarchy without a single constraint
//! - `library` - a cascaded list of documents whose default sequence comes from a provider

use std::sync::Arc;

use beanval_core::{names, Annotation, BeanRef, DynamicBean, TypeName, Value};
use beanval_descriptor::builtin;
use beanval_types::{MethodDef, ParameterDef, PropertyDef, TypeRegistry, TypeRegistryBuilder, ValueType};

pub const ORDER: &str = "com.acme.Order";
pub const CUSTOMER: &str = "com.acme.Customer";
pub const PERSON: &str = "com.acme.Person";
pub const PLAIN: &str = "com.acme.Plain";
pub const PLAIN_BASE: &str = "com.acme.PlainBase";
pub const LIBRARY: &str = "com.acme.Library";
pub const DOC: &str = "com.acme.Doc";

/// Key `Doc` names in its `GroupSequenceProvider` annotation.
pub const DOC_SEQUENCE: &str = "docs";

/// Group checked only on request.
pub const EXTENDED: &str = "com.acme.groups.Extended";
/// Group the cascade into `Order.customer` converts `Default` to.
pub const FULL: &str = "com.acme.groups.Full";
/// Sequence of `Default` then `Extended`.
pub const CHECKS: &str = "com.acme.groups.Checks";

fn string() -> ValueType {
    ValueType::named("String")
}

fn groups(builder: &mut TypeRegistryBuilder) {
    builder.add_interface(EXTENDED).done().unwrap();
    builder.add_interface(FULL).done().unwrap();
    builder
        .add_interface(CHECKS)
        .annotate(Annotation::group_sequence([names::DEFAULT_GROUP, EXTENDED]))
        .done()
        .unwrap();
}

fn customer_type(builder: &mut TypeRegistryBuilder) {
    builder
        .add_class(CUSTOMER)
        .property(PropertyDef::new("name", string()).annotate(builtin::not_null()))
        .property(PropertyDef::new("email", string()).annotate(builtin::not_null().groups([FULL])))
        .done()
        .unwrap();
}

/// `Order { @NotNull id; @Valid customer; @Size(max 5, Extended) note }`
/// and `Customer { @NotNull name; @NotNull(Full) email }`.
pub fn shop() -> TypeRegistry {
    let mut builder = TypeRegistryBuilder::new();
    groups(&mut builder);
    customer_type(&mut builder);
    builder
        .add_class(ORDER)
        .property(PropertyDef::new("id", string()).annotate(builtin::not_null()))
        .property(PropertyDef::new("customer", ValueType::named(CUSTOMER)).annotate(Annotation::valid()))
        .property(PropertyDef::new("note", string()).annotate(builtin::size(0, 5).groups([EXTENDED])))
        .method(
            MethodDef::new("ship")
                .param(ParameterDef::new("days", ValueType::named("int")).annotate(builtin::max(30)))
                .returns(string())
                .annotate(builtin::not_null()),
        )
        .done()
        .unwrap();
    builder.build()
}

/// Like `shop`, but the cascade into `customer` converts `Default` to `Full`.
pub fn shop_with_conversion() -> TypeRegistry {
    let mut builder = TypeRegistryBuilder::new();
    groups(&mut builder);
    customer_type(&mut builder);
    builder
        .add_class(ORDER)
        .property(PropertyDef::new("id", string()).annotate(builtin::not_null()))
        .property(
            PropertyDef::new("customer", ValueType::named(CUSTOMER))
                .annotate(Annotation::valid())
                .annotate(Annotation::convert_group(names::DEFAULT_GROUP, FULL)),
        )
        .done()
        .unwrap();
    builder.build()
}

/// Like `shop`, but `Order` redefines its default group sequence as
/// `[Order, Extended]`.
pub fn shop_with_default_sequence() -> TypeRegistry {
    let mut builder = TypeRegistryBuilder::new();
    groups(&mut builder);
    customer_type(&mut builder);
    builder
        .add_class(ORDER)
        .annotate(Annotation::group_sequence([ORDER, EXTENDED]))
        .property(PropertyDef::new("id", string()).annotate(builtin::not_null()))
        .property(PropertyDef::new("note", string()).annotate(builtin::size(0, 5).groups([EXTENDED])))
        .done()
        .unwrap();
    builder.build()
}

pub fn customer(name: impl Into<Value>) -> Value {
    DynamicBean::new(CUSTOMER).with("name", name).into_ref().into()
}

pub fn order(id: impl Into<Value>, customer: impl Into<Value>) -> BeanRef {
    DynamicBean::new(ORDER)
        .with("id", id)
        .with("customer", customer)
        .into_ref()
}

pub fn order_with_note(id: impl Into<Value>, note: impl Into<Value>) -> BeanRef {
    DynamicBean::new(ORDER).with("id", id).with("note", note).into_ref()
}

/// `Person { @NotNull name; @Valid partner }`.
pub fn people() -> TypeRegistry {
    let mut builder = TypeRegistryBuilder::new();
    builder
        .add_class(PERSON)
        .property(PropertyDef::new("name", string()).annotate(builtin::not_null()))
        .property(PropertyDef::new("partner", ValueType::named(PERSON)).annotate(Annotation::valid()))
        .done()
        .unwrap();
    builder.build()
}

/// Two persons who are each other's partner.
pub fn partners(first: impl Into<Value>, second: impl Into<Value>) -> BeanRef {
    let a: Arc<DynamicBean> = DynamicBean::new(PERSON).with("name", first).shared();
    let b: Arc<DynamicBean> = DynamicBean::new(PERSON).with("name", second).shared();
    a.set("partner", BeanRef::from(Arc::clone(&b)));
    b.set("partner", BeanRef::from(Arc::clone(&a)));
    BeanRef::from(a)
}

/// `Plain extends PlainBase`, with properties and methods but no
/// constraints anywhere.
pub fn plain() -> TypeRegistry {
    let mut builder = TypeRegistryBuilder::new();
    builder
        .add_class(PLAIN_BASE)
        .property(PropertyDef::new("id", string()))
        .done()
        .unwrap();
    builder
        .add_class(PLAIN)
        .extends(PLAIN_BASE)
        .property(PropertyDef::new("label", string()))
        .method(MethodDef::new("rename").param(ParameterDef::new("label", string())))
        .done()
        .unwrap();
    builder.build()
}

pub fn plain_bean() -> BeanRef {
    DynamicBean::new(PLAIN).with("id", Value::Null).with("label", "x").into_ref()
}

/// `Library { @Valid docs: List<Doc> }` and
/// `@GroupSequenceProvider("docs") Doc { @NotNull title; @Size(max 5, Extended) note; draft }`.
///
/// The provider itself is registered by each test, see `doc_sequence`.
pub fn library() -> TypeRegistry {
    let mut builder = TypeRegistryBuilder::new();
    groups(&mut builder);
    builder
        .add_class(DOC)
        .annotate(Annotation::group_sequence_provider(DOC_SEQUENCE))
        .property(PropertyDef::new("title", string()).annotate(builtin::not_null()))
        .property(PropertyDef::new("note", string()).annotate(builtin::size(0, 5).groups([EXTENDED])))
        .property(PropertyDef::new("draft", ValueType::named("boolean")))
        .done()
        .unwrap();
    builder
        .add_class(LIBRARY)
        .property(PropertyDef::new("docs", ValueType::list(ValueType::named(DOC))).annotate(Annotation::valid()))
        .done()
        .unwrap();
    builder.build()
}

/// Drafts are only checked for `Default`. Everything else checks
/// `Extended` first and stops there on failure.
pub fn doc_sequence(bean: Option<&BeanRef>) -> Vec<TypeName> {
    let draft = bean.and_then(|b| b.property("draft").as_bool()).unwrap_or(false);
    if draft {
        vec![TypeName::new(DOC)]
    } else {
        vec![TypeName::new(EXTENDED), TypeName::new(DOC)]
    }
}

pub fn doc(title: impl Into<Value>, note: impl Into<Value>, draft: bool) -> BeanRef {
    DynamicBean::new(DOC)
        .with("title", title)
        .with("note", note)
        .with("draft", draft)
        .into_ref()
}

pub fn library_of(docs: impl IntoIterator<Item = BeanRef>) -> BeanRef {
    let docs: Vec<Value> = docs.into_iter().map(Value::from).collect();
    DynamicBean::new(LIBRARY).with("docs", docs).into_ref()
}
