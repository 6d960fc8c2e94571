//! The registry of known constraint definitions.

use crate::definition::{AttributeKind, ConstraintDefinition, GROUPS, MESSAGE, PAYLOAD};
use crate::{builtin, DescriptorError, DescriptorResult, VALIDATION_APPLIES_TO};
use beanval_core::TypeName;
use std::collections::HashMap;

/// Known constraint definitions, keyed by name.
///
/// Definitions are checked when registered; composing constraints must be
/// registered before the constraints composed of them.
#[derive(Debug, Default, Clone)]
pub struct ConstraintDefinitions {
    definitions: HashMap<TypeName, ConstraintDefinition>,
}

impl ConstraintDefinitions {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in definitions.
    pub fn with_builtins() -> Self {
        let mut definitions = Self::new();
        for definition in builtin::definitions() {
            // Built-ins are well-formed and registered in dependency order.
            if let Err(err) = definitions.register(definition) {
                debug_assert!(false, "invalid built-in definition: {}", err);
            }
        }
        definitions
    }

    /// Register a definition.
    pub fn register(&mut self, definition: ConstraintDefinition) -> DescriptorResult<()> {
        let name = definition.name.to_string();
        if self.definitions.contains_key(&definition.name) {
            return Err(DescriptorError::DuplicateDefinition { name });
        }

        self.check_attributes(&definition)?;
        self.check_composition(&definition)?;

        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Get a definition by name.
    pub fn get(&self, name: &TypeName) -> Option<&ConstraintDefinition> {
        self.definitions.get(name)
    }

    /// Returns true if the name is a registered constraint.
    pub fn is_constraint(&self, name: &TypeName) -> bool {
        self.definitions.contains_key(name)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn check_attributes(&self, definition: &ConstraintDefinition) -> DescriptorResult<()> {
        let name = definition.name.as_str();
        let expect = |attribute: &str, kind: AttributeKind| -> DescriptorResult<()> {
            match definition.attribute_def(attribute) {
                Some(def) if def.kind == kind => Ok(()),
                Some(def) => Err(DescriptorError::illegal_attribute(
                    name,
                    attribute,
                    format!("reserved attribute must be of kind {}, not {}", kind, def.kind),
                )),
                None => Err(DescriptorError::illegal_attribute(
                    name,
                    attribute,
                    "reserved attribute is missing",
                )),
            }
        };
        expect(MESSAGE, AttributeKind::String)?;
        expect(GROUPS, AttributeKind::Types)?;
        expect(PAYLOAD, AttributeKind::Types)?;

        for attribute in &definition.attributes {
            if attribute.name == VALIDATION_APPLIES_TO {
                if !(definition.supports_generic() && definition.supports_cross_parameter()) {
                    return Err(DescriptorError::illegal_attribute(
                        name,
                        attribute.name.as_str(),
                        "only constraints supporting both validation targets may declare it",
                    ));
                }
                continue;
            }
            if attribute.name.starts_with("valid") {
                return Err(DescriptorError::illegal_attribute(
                    name,
                    attribute.name.as_str(),
                    "attribute names starting with 'valid' are reserved",
                ));
            }
        }

        if definition.targets.is_empty() {
            return Err(DescriptorError::illegal_target(
                name,
                "definition",
                "no validation target declared",
            ));
        }
        Ok(())
    }

    fn check_composition(&self, definition: &ConstraintDefinition) -> DescriptorResult<()> {
        let name = definition.name.as_str();
        for composing in &definition.composing {
            let composing_def = self
                .definitions
                .get(&composing.annotation.name)
                .ok_or_else(|| DescriptorError::unknown_constraint(composing.annotation.name.as_str()))?;

            for (from, to) in &composing.overrides {
                let outer = definition.attribute_def(from).ok_or_else(|| {
                    DescriptorError::invalid_override(
                        name,
                        format!("overriding attribute '{}' is not declared", from),
                    )
                })?;
                let inner = composing_def.attribute_def(to).ok_or_else(|| {
                    DescriptorError::invalid_override(
                        name,
                        format!(
                            "overridden attribute '{}' does not exist on {}",
                            to, composing_def.name
                        ),
                    )
                })?;
                if outer.kind != inner.kind {
                    return Err(DescriptorError::invalid_override(
                        name,
                        format!(
                            "'{}' ({}) cannot override {}.{} ({})",
                            from, outer.kind, composing_def.name, to, inner.kind
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}
