//! TypeRegistryBuilder for constructing an immutable TypeRegistry.

use crate::{
    ConstructorDef, MethodDef, PropertyDef, SubtypeIndex, TypeDef, TypeKind, TypeRegistry,
};
use beanval_core::{names, Annotation, TypeId, TypeName};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during type registration and lookup.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("Duplicate type name: {0}")]
    DuplicateTypeName(String),

    #[error("Unknown supertype '{parent}' of type '{type_name}'")]
    UnknownSupertype { type_name: String, parent: String },

    #[error("Type '{type_name}' cannot extend '{parent}': {reason}")]
    IllegalSupertype {
        type_name: String,
        parent: String,
        reason: String,
    },

    #[error("Duplicate member '{member}' in type '{type_name}'")]
    DuplicateMember { type_name: String, member: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),
}

impl TypeError {
    pub fn illegal_supertype(
        type_name: impl Into<String>,
        parent: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::IllegalSupertype {
            type_name: type_name.into(),
            parent: parent.into(),
            reason: reason.into(),
        }
    }

    pub fn duplicate_member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self::DuplicateMember {
            type_name: type_name.into(),
            member: member.into(),
        }
    }
}

/// Builder for constructing an immutable TypeRegistry.
///
/// Supertypes must be registered before their subtypes, which rules out
/// inheritance cycles by construction.
#[derive(Debug)]
pub struct TypeRegistryBuilder {
    /// Next type ID to allocate.
    next_type_id: u32,
    /// Types being built.
    types: HashMap<TypeId, TypeDef>,
    /// Type name to ID mapping.
    type_names: HashMap<TypeName, TypeId>,
}

impl Default for TypeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistryBuilder {
    /// Create a new builder with the `Default` group pre-registered.
    pub fn new() -> Self {
        let mut builder = Self {
            next_type_id: 0,
            types: HashMap::new(),
            type_names: HashMap::new(),
        };
        let id = builder.allocate_id();
        let name = TypeName::new(names::DEFAULT_GROUP);
        builder.type_names.insert(name.clone(), id);
        builder.types.insert(
            id,
            TypeDef {
                id,
                name,
                kind: TypeKind::Interface,
                superclass: None,
                interfaces: Vec::new(),
                annotations: Vec::new(),
                properties: Vec::new(),
                methods: Vec::new(),
                constructors: Vec::new(),
            },
        );
        builder
    }

    fn allocate_id(&mut self) -> TypeId {
        let id = TypeId::new(self.next_type_id);
        self.next_type_id += 1;
        id
    }

    /// Add a class definition.
    pub fn add_class(&mut self, name: impl Into<TypeName>) -> TypeBuilder<'_> {
        self.add_type(name.into(), TypeKind::Class)
    }

    /// Add an interface definition. Groups are interfaces.
    pub fn add_interface(&mut self, name: impl Into<TypeName>) -> TypeBuilder<'_> {
        self.add_type(name.into(), TypeKind::Interface)
    }

    fn add_type(&mut self, name: TypeName, kind: TypeKind) -> TypeBuilder<'_> {
        TypeBuilder {
            builder: self,
            name,
            kind,
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Look up the id of an already registered type.
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(&TypeName::new(name)).copied()
    }

    /// Build the immutable TypeRegistry.
    pub fn build(self) -> TypeRegistry {
        let subtype_index = SubtypeIndex::build(&self.types);
        TypeRegistry::new(self.types, self.type_names, subtype_index)
    }
}

/// Builder for a class or interface definition.
pub struct TypeBuilder<'a> {
    builder: &'a mut TypeRegistryBuilder,
    name: TypeName,
    kind: TypeKind,
    superclass: Option<TypeName>,
    interfaces: Vec<TypeName>,
    annotations: Vec<Annotation>,
    properties: Vec<PropertyDef>,
    methods: Vec<MethodDef>,
    constructors: Vec<ConstructorDef>,
}

impl<'a> TypeBuilder<'a> {
    /// Set the superclass (classes) or add an extended interface (interfaces).
    pub fn extends(mut self, parent: impl Into<TypeName>) -> Self {
        match self.kind {
            TypeKind::Class => self.superclass = Some(parent.into()),
            TypeKind::Interface => self.interfaces.push(parent.into()),
        }
        self
    }

    /// Add an implemented interface.
    pub fn implements(mut self, interface: impl Into<TypeName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Add a type-level annotation.
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add a property.
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a method.
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a constructor.
    pub fn constructor(mut self, constructor: ConstructorDef) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Finish building this type.
    pub fn done(self) -> Result<TypeId, TypeError> {
        // Check for duplicate name
        if self.builder.type_names.contains_key(&self.name) {
            return Err(TypeError::DuplicateTypeName(self.name.to_string()));
        }

        let superclass = match &self.superclass {
            Some(parent) => {
                let parent_def = self.resolve_parent(parent)?;
                if parent_def.is_interface() {
                    return Err(TypeError::illegal_supertype(
                        self.name.as_str(),
                        parent.as_str(),
                        "a class cannot extend an interface",
                    ));
                }
                Some(parent_def.id)
            }
            None => None,
        };

        let mut interfaces = Vec::new();
        for interface in &self.interfaces {
            let parent_def = self.resolve_parent(interface)?;
            if !parent_def.is_interface() {
                return Err(TypeError::illegal_supertype(
                    self.name.as_str(),
                    interface.as_str(),
                    "only interfaces can be implemented or extended by interfaces",
                ));
            }
            interfaces.push(parent_def.id);
        }

        self.check_unique_members()?;

        let id = self.builder.allocate_id();
        let type_def = TypeDef {
            id,
            name: self.name.clone(),
            kind: self.kind,
            superclass,
            interfaces,
            annotations: self.annotations,
            properties: self.properties,
            methods: self.methods,
            constructors: self.constructors,
        };

        self.builder.type_names.insert(self.name, id);
        self.builder.types.insert(id, type_def);

        Ok(id)
    }

    fn resolve_parent(&self, parent: &TypeName) -> Result<&TypeDef, TypeError> {
        self.builder
            .type_names
            .get(parent)
            .and_then(|id| self.builder.types.get(id))
            .ok_or_else(|| TypeError::UnknownSupertype {
                type_name: self.name.to_string(),
                parent: parent.to_string(),
            })
    }

    fn check_unique_members(&self) -> Result<(), TypeError> {
        let mut seen = std::collections::HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name.clone()) {
                return Err(TypeError::duplicate_member(
                    self.name.as_str(),
                    property.name.as_str(),
                ));
            }
        }
        let mut signatures = std::collections::HashSet::new();
        for method in &self.methods {
            let signature = method.signature();
            if !signatures.insert(signature.clone()) {
                return Err(TypeError::duplicate_member(
                    self.name.as_str(),
                    signature.to_string(),
                ));
            }
        }
        for constructor in &self.constructors {
            let signature = constructor.signature(&self.name);
            if !signatures.insert(signature.clone()) {
                return Err(TypeError::duplicate_member(
                    self.name.as_str(),
                    signature.to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterDef, ValueType};

    // ========== TEST: default_group_preregistered ==========
    #[test]
    fn test_default_group_preregistered() {
        // GIVEN an empty builder
        let registry = TypeRegistryBuilder::new().build();

        // WHEN looking up the Default group
        let default = registry.get_type_by_name(names::DEFAULT_GROUP);

        // THEN it exists and is an interface
        assert!(default.is_some());
        assert!(default.unwrap().is_interface());
    }

    // ========== TEST: duplicate_type_name_error ==========
    #[test]
    fn test_duplicate_type_name_error() {
        // GIVEN builder with class Order
        let mut builder = TypeRegistryBuilder::new();
        builder.add_class("Order").done().unwrap();

        // WHEN add another type with same name
        let result = builder.add_interface("Order").done();

        // THEN returns DuplicateTypeName error
        assert!(matches!(result, Err(TypeError::DuplicateTypeName(_))));
    }

    // ========== TEST: unknown_supertype_error ==========
    #[test]
    fn test_unknown_supertype_error() {
        // GIVEN empty builder
        let mut builder = TypeRegistryBuilder::new();

        // WHEN add class extending non-existent parent
        let result = builder.add_class("Order").extends("Base").done();

        // THEN returns UnknownSupertype error
        assert!(matches!(result, Err(TypeError::UnknownSupertype { .. })));
    }

    // ========== TEST: class_cannot_extend_interface ==========
    #[test]
    fn test_class_cannot_extend_interface() {
        let mut builder = TypeRegistryBuilder::new();
        builder.add_interface("Named").done().unwrap();

        let result = builder.add_class("Order").extends("Named").done();

        assert!(matches!(result, Err(TypeError::IllegalSupertype { .. })));
    }

    // ========== TEST: interface_cannot_implement_class ==========
    #[test]
    fn test_cannot_implement_class() {
        let mut builder = TypeRegistryBuilder::new();
        builder.add_class("Base").done().unwrap();

        let result = builder.add_class("Order").implements("Base").done();

        assert!(matches!(result, Err(TypeError::IllegalSupertype { .. })));
    }

    // ========== TEST: duplicate_method_signature ==========
    #[test]
    fn test_duplicate_method_signature() {
        let mut builder = TypeRegistryBuilder::new();
        let method =
            MethodDef::new("m").param(ParameterDef::new("s", ValueType::named("String")));

        let result = builder
            .add_class("Order")
            .method(method.clone())
            .method(method)
            .done();

        assert!(matches!(result, Err(TypeError::DuplicateMember { .. })));
    }
}
