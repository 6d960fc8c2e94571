//! Type model definitions.

use beanval_core::{Annotation, TypeId, TypeName};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Declared type of a property, parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A scalar or bean type by name (`String`, `com.acme.Customer`).
    Named(TypeName),
    List(Box<ValueType>),
    Set(Box<ValueType>),
    Map(Box<ValueType>, Box<ValueType>),
    Optional(Box<ValueType>),
}

impl ValueType {
    pub fn named(name: impl Into<TypeName>) -> Self {
        ValueType::Named(name.into())
    }

    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    pub fn set(element: ValueType) -> Self {
        ValueType::Set(Box::new(element))
    }

    pub fn map(key: ValueType, value: ValueType) -> Self {
        ValueType::Map(Box::new(key), Box::new(value))
    }

    pub fn optional(element: ValueType) -> Self {
        ValueType::Optional(Box::new(element))
    }

    /// Type of the contained elements (map values for maps).
    pub fn element_type(&self) -> Option<&ValueType> {
        match self {
            ValueType::Named(_) => None,
            ValueType::List(e) | ValueType::Set(e) | ValueType::Optional(e) => Some(e),
            ValueType::Map(_, v) => Some(v),
        }
    }

    /// The named type, looking through containers.
    pub fn innermost(&self) -> &TypeName {
        match self {
            ValueType::Named(name) => name,
            ValueType::List(e) | ValueType::Set(e) | ValueType::Optional(e) => e.innermost(),
            ValueType::Map(_, v) => v.innermost(),
        }
    }

    /// Returns true for list, set, map and optional types.
    pub fn is_container(&self) -> bool {
        !matches!(self, ValueType::Named(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Named(name) => write!(f, "{}", name.simple_name()),
            ValueType::List(e) => write!(f, "List<{}>", e),
            ValueType::Set(e) => write!(f, "Set<{}>", e),
            ValueType::Map(k, v) => write!(f, "Map<{},{}>", k, v),
            ValueType::Optional(e) => write!(f, "Optional<{}>", e),
        }
    }
}

/// Method or constructor signature: name plus parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl Signature {
    pub fn new<I, S>(name: impl Into<String>, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameter_types.join(", "))
    }
}

/// Whether a type is a class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// Member visibility. Private members do not take part in overriding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Executable kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutableKind {
    Method,
    Constructor,
}

/// A field-backed property.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub value_type: ValueType,
    /// Annotations on the property itself.
    pub annotations: Vec<Annotation>,
    /// Annotations on the container's element type argument.
    pub element_annotations: Vec<Annotation>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            annotations: Vec::new(),
            element_annotations: Vec::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotate_element(mut self, annotation: Annotation) -> Self {
        self.element_annotations.push(annotation);
        self
    }
}

/// A method or constructor parameter.
#[derive(Debug, Clone)]
pub struct ParameterDef {
    pub name: String,
    pub value_type: ValueType,
    pub annotations: Vec<Annotation>,
    pub element_annotations: Vec<Annotation>,
}

impl ParameterDef {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            annotations: Vec::new(),
            element_annotations: Vec::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotate_element(mut self, annotation: Annotation) -> Self {
        self.element_annotations.push(annotation);
        self
    }
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub parameters: Vec<ParameterDef>,
    /// None for void methods.
    pub return_type: Option<ValueType>,
    pub visibility: Visibility,
    /// Annotations on the method: return-value or cross-parameter constraints,
    /// `Valid` and `ConvertGroup` for the return value.
    pub annotations: Vec<Annotation>,
    /// Annotations on the return type's element type argument.
    pub return_element_annotations: Vec<Annotation>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            return_element_annotations: Vec::new(),
        }
    }

    pub fn param(mut self, parameter: ParameterDef) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, return_type: ValueType) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotate_return_element(mut self, annotation: Annotation) -> Self {
        self.return_element_annotations.push(annotation);
        self
    }

    pub fn signature(&self) -> Signature {
        Signature::new(
            self.name.clone(),
            self.parameters.iter().map(|p| p.value_type.to_string()),
        )
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// The property this method reads, for JavaBeans-style getters
    /// (`getName()`, `isActive()`).
    pub fn getter_property_name(&self) -> Option<String> {
        if !self.parameters.is_empty() || self.return_type.is_none() {
            return None;
        }
        let rest = self
            .name
            .strip_prefix("get")
            .or_else(|| self.name.strip_prefix("is"))?;
        let mut chars = rest.chars();
        let first = chars.next()?;
        if !first.is_uppercase() {
            return None;
        }
        Some(first.to_lowercase().chain(chars).collect())
    }
}

/// A constructor declaration.
#[derive(Debug, Clone, Default)]
pub struct ConstructorDef {
    pub parameters: Vec<ParameterDef>,
    /// Constraints on the created object, cross-parameter constraints, `Valid`.
    pub annotations: Vec<Annotation>,
}

impl ConstructorDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, parameter: ParameterDef) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Constructors are named after the simple name of their type.
    pub fn signature(&self, owner: &TypeName) -> Signature {
        Signature::new(
            owner.simple_name(),
            self.parameters.iter().map(|p| p.value_type.to_string()),
        )
    }
}

/// Class or interface definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Unique identifier.
    pub id: TypeId,
    /// Fully qualified name.
    pub name: TypeName,
    pub kind: TypeKind,
    /// Direct superclass (classes only).
    pub superclass: Option<TypeId>,
    /// Directly implemented (or, for interfaces, extended) interfaces.
    pub interfaces: Vec<TypeId>,
    /// Type-level annotations.
    pub annotations: Vec<Annotation>,
    pub properties: Vec<PropertyDef>,
    pub methods: Vec<MethodDef>,
    pub constructors: Vec<ConstructorDef>,
}

impl TypeDef {
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Direct supertypes: superclass first, then interfaces.
    pub fn parent_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.superclass.into_iter().chain(self.interfaces.iter().copied())
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, signature: &Signature) -> Option<&MethodDef> {
        self.methods.iter().find(|m| &m.signature() == signature)
    }

    pub fn constructor(&self, signature: &Signature) -> Option<&ConstructorDef> {
        self.constructors
            .iter()
            .find(|c| &c.signature(&self.name) == signature)
    }

    /// First annotation with the given name.
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is(name))
    }
}

/// Precomputed subtype relationships.
#[derive(Debug, Default)]
pub struct SubtypeIndex {
    /// For each type, the set of all its subtypes (transitive).
    subtypes: HashMap<TypeId, HashSet<TypeId>>,
    /// For each type, the set of all its supertypes (transitive).
    supertypes: HashMap<TypeId, HashSet<TypeId>>,
}

impl SubtypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the subtype index from type definitions.
    ///
    /// Supertypes are always registered before their subtypes, so a single
    /// pass in id order sees every parent's closure already complete.
    pub fn build(types: &HashMap<TypeId, TypeDef>) -> Self {
        let mut index = Self::new();

        let mut ids: Vec<TypeId> = types.keys().copied().collect();
        ids.sort();

        for &type_id in &ids {
            index.subtypes.entry(type_id).or_default();
            let mut closure = HashSet::new();
            if let Some(type_def) = types.get(&type_id) {
                for parent_id in type_def.parent_ids() {
                    closure.insert(parent_id);
                    if let Some(parent_closure) = index.supertypes.get(&parent_id) {
                        closure.extend(parent_closure.iter().copied());
                    }
                }
            }
            for &super_id in &closure {
                index.subtypes.entry(super_id).or_default().insert(type_id);
            }
            index.supertypes.insert(type_id, closure);
        }

        index
    }

    /// Check if `sub` is a subtype of `super_type` (reflexive).
    pub fn is_subtype(&self, sub: TypeId, super_type: TypeId) -> bool {
        if sub == super_type {
            return true;
        }
        self.supertypes
            .get(&sub)
            .map(|set| set.contains(&super_type))
            .unwrap_or(false)
    }

    /// Get all subtypes of a type (not including the type itself).
    pub fn get_subtypes(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.subtypes
            .get(&type_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get all supertypes of a type (not including the type itself).
    pub fn get_supertypes(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.supertypes
            .get(&type_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_display() {
        let t = ValueType::map(ValueType::named("String"), ValueType::named("com.acme.Address"));
        assert_eq!(t.to_string(), "Map<String,Address>");
        assert_eq!(t.innermost(), &TypeName::new("com.acme.Address"));
    }

    #[test]
    fn test_method_signature() {
        let method = MethodDef::new("placeOrder")
            .param(ParameterDef::new("customer", ValueType::named("com.acme.Customer")))
            .param(ParameterDef::new("items", ValueType::list(ValueType::named("Item"))));

        assert_eq!(method.signature().to_string(), "placeOrder(Customer, List<Item>)");
        assert_eq!(method.signature().arity(), 2);
    }

    #[test]
    fn test_getter_property_name() {
        let getter = MethodDef::new("getFirstName").returns(ValueType::named("String"));
        let boolean = MethodDef::new("isActive").returns(ValueType::named("Boolean"));
        let not_getter = MethodDef::new("getter").returns(ValueType::named("String"));
        let void = MethodDef::new("getName");

        assert_eq!(getter.getter_property_name().as_deref(), Some("firstName"));
        assert_eq!(boolean.getter_property_name().as_deref(), Some("active"));
        assert_eq!(not_getter.getter_property_name(), None);
        assert_eq!(void.getter_property_name(), None);
    }
}
