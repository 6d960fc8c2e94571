//! The TypeRegistry - immutable type model lookup.

use crate::{MethodDef, Signature, SubtypeIndex, TypeDef, TypeError};
use beanval_core::{TypeId, TypeName};
use std::collections::{HashMap, HashSet};

/// The TypeRegistry provides lookup of declared types and answers
/// hierarchy questions. It is immutable after construction.
#[derive(Debug)]
pub struct TypeRegistry {
    /// Type definitions by ID.
    types: HashMap<TypeId, TypeDef>,
    /// Type ID lookup by name.
    type_names: HashMap<TypeName, TypeId>,
    /// Precomputed subtype relationships.
    subtype_index: SubtypeIndex,
}

impl TypeRegistry {
    pub(crate) fn new(
        types: HashMap<TypeId, TypeDef>,
        type_names: HashMap<TypeName, TypeId>,
        subtype_index: SubtypeIndex,
    ) -> Self {
        Self {
            types,
            type_names,
            subtype_index,
        }
    }

    // ==================== Type Lookups ====================

    /// Get a type definition by name.
    pub fn get_type_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.type_names
            .get(&TypeName::new(name))
            .and_then(|id| self.types.get(id))
    }

    /// Get a type definition by ID.
    pub fn get_type(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(&id)
    }

    /// Get a type ID by name.
    pub fn type_id(&self, name: &TypeName) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    /// Get a type definition by name, failing for unknown names.
    pub fn resolve(&self, name: &TypeName) -> Result<&TypeDef, TypeError> {
        self.type_id(name)
            .and_then(|id| self.types.get(&id))
            .ok_or_else(|| TypeError::UnknownType(name.to_string()))
    }

    /// Returns true if the name is a registered interface.
    pub fn is_interface(&self, name: &TypeName) -> bool {
        self.type_id(name)
            .and_then(|id| self.types.get(&id))
            .map(TypeDef::is_interface)
            .unwrap_or(false)
    }

    /// Iterate over all type definitions in registration order.
    pub fn all_types(&self) -> impl Iterator<Item = &TypeDef> {
        let mut ids: Vec<TypeId> = self.types.keys().copied().collect();
        ids.sort();
        ids.into_iter().filter_map(move |id| self.types.get(&id))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if only the built-in types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }

    // ==================== Hierarchy ====================

    /// Check if `sub` is a subtype of `super_type` (reflexive).
    pub fn is_subtype(&self, sub: TypeId, super_type: TypeId) -> bool {
        self.subtype_index.is_subtype(sub, super_type)
    }

    /// Check subtyping by name. Unknown names are never subtypes.
    pub fn is_subtype_by_name(&self, sub: &TypeName, super_type: &TypeName) -> bool {
        match (self.type_id(sub), self.type_id(super_type)) {
            (Some(a), Some(b)) => self.is_subtype(a, b),
            _ => false,
        }
    }

    /// Get all subtypes of a type (not including the type itself).
    pub fn get_subtypes(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.subtype_index.get_subtypes(type_id)
    }

    /// Get all supertypes of a type (not including the type itself).
    pub fn get_supertypes(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.subtype_index.get_supertypes(type_id)
    }

    /// Linearized hierarchy: the type itself, its superclasses leaf-to-root,
    /// then all interfaces. Interfaces are collected per class in that
    /// order, depth-first with their super-interfaces, without duplicates.
    pub fn hierarchy(&self, type_id: TypeId) -> Vec<TypeId> {
        let classes = self.class_hierarchy(type_id);
        let mut result = classes.clone();
        let mut seen: HashSet<TypeId> = classes.iter().copied().collect();

        for class_id in classes {
            if let Some(type_def) = self.types.get(&class_id) {
                for &interface in &type_def.interfaces {
                    self.collect_interfaces(interface, &mut seen, &mut result);
                }
            }
        }
        result
    }

    fn collect_interfaces(&self, id: TypeId, seen: &mut HashSet<TypeId>, out: &mut Vec<TypeId>) {
        if !seen.insert(id) {
            return;
        }
        out.push(id);
        if let Some(type_def) = self.types.get(&id) {
            for &parent in &type_def.interfaces {
                self.collect_interfaces(parent, seen, out);
            }
        }
    }

    /// The type and its superclasses, leaf-to-root. Interfaces are excluded
    /// unless the type itself is one.
    pub fn class_hierarchy(&self, type_id: TypeId) -> Vec<TypeId> {
        let mut result = Vec::new();
        let mut current = Some(type_id);
        while let Some(id) = current {
            if result.contains(&id) {
                break;
            }
            result.push(id);
            current = self.types.get(&id).and_then(|t| t.superclass);
        }
        result
    }

    /// Interfaces implemented by the type itself together with their
    /// super-interfaces (not those inherited through superclasses).
    pub fn directly_implemented_interfaces(&self, type_id: TypeId) -> Vec<TypeId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        if let Some(type_def) = self.types.get(&type_id) {
            for &interface in &type_def.interfaces {
                self.collect_interfaces(interface, &mut seen, &mut result);
            }
        }
        result
    }

    /// All super-interfaces of an interface, transitively, in linearized order.
    pub fn super_interfaces(&self, type_id: TypeId) -> Vec<TypeId> {
        self.directly_implemented_interfaces(type_id)
    }

    // ==================== Overriding ====================

    /// Returns true if the method `signature` declared on `sub` overrides the
    /// one declared on `super_type`: both declare it, `sub` is a strict subtype
    /// and the super method is not private.
    pub fn overrides(&self, sub: TypeId, super_type: TypeId, signature: &Signature) -> bool {
        if sub == super_type || !self.is_subtype(sub, super_type) {
            return false;
        }
        let declared_on_sub = self
            .get_type(sub)
            .and_then(|t| t.method(signature))
            .is_some();
        let super_method = self.get_type(super_type).and_then(|t| t.method(signature));
        declared_on_sub && matches!(super_method, Some(m) if !m.is_private())
    }

    /// Returns true if neither declaring type is a subtype of the other.
    pub fn is_parallel(&self, a: TypeId, b: TypeId) -> bool {
        !self.is_subtype(a, b) && !self.is_subtype(b, a)
    }

    /// Methods overridden by `signature` on `type_id`, in hierarchy order.
    pub fn overridden_methods(
        &self,
        type_id: TypeId,
        signature: &Signature,
    ) -> Vec<(TypeId, &MethodDef)> {
        self.hierarchy(type_id)
            .into_iter()
            .skip(1)
            .filter(|&super_id| self.overrides(type_id, super_id, signature))
            .filter_map(|super_id| {
                self.get_type(super_id)
                    .and_then(|t| t.method(signature))
                    .map(|m| (super_id, m))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{MethodDef, ParameterDef, TypeRegistryBuilder, ValueType};

    fn method_m() -> MethodDef {
        MethodDef::new("m").param(ParameterDef::new("s", ValueType::named("String")))
    }

    // ========== TEST: hierarchy_linearization ==========
    #[test]
    fn test_hierarchy_linearization() {
        // GIVEN Base implements I1, Impl extends Base implements I2, I2 extends I3
        let mut builder = TypeRegistryBuilder::new();
        let i1 = builder.add_interface("I1").done().unwrap();
        let i3 = builder.add_interface("I3").done().unwrap();
        let i2 = builder.add_interface("I2").extends("I3").done().unwrap();
        let base = builder.add_class("Base").implements("I1").done().unwrap();
        let imp = builder
            .add_class("Impl")
            .extends("Base")
            .implements("I2")
            .done()
            .unwrap();
        let registry = builder.build();

        // WHEN linearizing Impl
        let hierarchy = registry.hierarchy(imp);

        // THEN self, superclasses leaf-to-root, then interfaces
        assert_eq!(hierarchy, vec![imp, base, i2, i3, i1]);
        assert_eq!(registry.class_hierarchy(imp), vec![imp, base]);
        assert_eq!(registry.directly_implemented_interfaces(imp), vec![i2, i3]);
    }

    // ========== TEST: check_subtype_relationship ==========
    #[test]
    fn test_check_subtype_relationship() {
        // GIVEN registry with Base <- Impl
        let mut builder = TypeRegistryBuilder::new();
        let base = builder.add_class("Base").done().unwrap();
        let imp = builder.add_class("Impl").extends("Base").done().unwrap();
        let registry = builder.build();

        // THEN subtyping holds in one direction only
        assert!(registry.is_subtype(imp, base));
        assert!(!registry.is_subtype(base, imp));
        assert_eq!(registry.get_subtypes(base).collect::<Vec<_>>(), vec![imp]);
    }

    // ========== TEST: overrides_relation ==========
    #[test]
    fn test_overrides_relation() {
        // GIVEN interface I declaring m and class C implementing it
        let mut builder = TypeRegistryBuilder::new();
        let i = builder.add_interface("I").method(method_m()).done().unwrap();
        let c = builder
            .add_class("C")
            .implements("I")
            .method(method_m())
            .done()
            .unwrap();
        let other = builder.add_class("Other").method(method_m()).done().unwrap();
        let registry = builder.build();
        let signature = method_m().signature();

        // THEN C.m overrides I.m, but not the unrelated Other.m
        assert!(registry.overrides(c, i, &signature));
        assert!(!registry.overrides(i, c, &signature));
        assert!(!registry.overrides(c, other, &signature));
        assert_eq!(registry.overridden_methods(c, &signature).len(), 1);
    }

    // ========== TEST: private_methods_not_overridden ==========
    #[test]
    fn test_private_methods_not_overridden() {
        let mut builder = TypeRegistryBuilder::new();
        let base = builder
            .add_class("Base")
            .method(method_m().private())
            .done()
            .unwrap();
        let sub = builder
            .add_class("Sub")
            .extends("Base")
            .method(method_m())
            .done()
            .unwrap();
        let registry = builder.build();

        assert!(!registry.overrides(sub, base, &method_m().signature()));
    }

    // ========== TEST: parallel_types ==========
    #[test]
    fn test_parallel_types() {
        let mut builder = TypeRegistryBuilder::new();
        let i1 = builder.add_interface("I1").done().unwrap();
        let i2 = builder.add_interface("I2").done().unwrap();
        let c = builder
            .add_class("C")
            .implements("I1")
            .implements("I2")
            .done()
            .unwrap();
        let registry = builder.build();

        assert!(registry.is_parallel(i1, i2));
        assert!(!registry.is_parallel(c, i1));
    }
}
