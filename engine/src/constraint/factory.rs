//! Initialized validators, cached per constraint descriptor.

use super::{ConstraintValidator, ConstraintValidators, ValidatorFailure};
use beanval_descriptor::ConstraintDescriptor;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

struct Initialized {
    // Holding the descriptor keeps its address, the cache key, from being reused.
    _descriptor: Arc<ConstraintDescriptor>,
    validator: Arc<dyn ConstraintValidator>,
}

/// Creates validators and keeps one initialized validator per descriptor.
pub struct ConstraintValidatorFactory {
    validators: ConstraintValidators,
    initialized: RwLock<HashMap<usize, Initialized>>,
}

impl ConstraintValidatorFactory {
    pub fn new(validators: ConstraintValidators) -> Self {
        Self {
            validators,
            initialized: RwLock::new(HashMap::new()),
        }
    }

    pub fn validators(&self) -> &ConstraintValidators {
        &self.validators
    }

    /// The initialized validator of a descriptor, or `None` when no
    /// validator is registered for its definition.
    pub fn validator_for(
        &self,
        descriptor: &Arc<ConstraintDescriptor>,
    ) -> Result<Option<Arc<dyn ConstraintValidator>>, ValidatorFailure> {
        let key = Arc::as_ptr(descriptor) as usize;
        if let Some(entry) = self.initialized.read().get(&key) {
            return Ok(Some(Arc::clone(&entry.validator)));
        }

        let Some(mut validator) = self
            .validators
            .create(descriptor.definition(), descriptor.constraint_type())
        else {
            return Ok(None);
        };
        validator.initialize(descriptor)?;
        let validator: Arc<dyn ConstraintValidator> = Arc::from(validator);

        let mut initialized = self.initialized.write();
        let entry = initialized.entry(key).or_insert_with(|| Initialized {
            _descriptor: Arc::clone(descriptor),
            validator: Arc::clone(&validator),
        });
        if Arc::ptr_eq(&entry.validator, &validator) {
            trace!(constraint = %descriptor.definition(), "initialized constraint validator");
        } else {
            warn!(constraint = %descriptor.definition(), "concurrent validator initialization discarded");
        }
        Ok(Some(Arc::clone(&entry.validator)))
    }

    /// Number of initialized validators.
    pub fn len(&self) -> usize {
        self.initialized.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.initialized.read().is_empty()
    }

    pub fn clear(&self) {
        self.initialized.write().clear();
    }
}

impl fmt::Debug for ConstraintValidatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintValidatorFactory")
            .field("validators", &self.validators)
            .field("initialized", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanval_core::Annotation;
    use beanval_descriptor::{
        builtin, ConstraintDefinition, ConstraintDefinitions, DescriptorBuilder, DescriptorContext,
        ElementKind,
    };
    use beanval_types::{TypeRegistry, TypeRegistryBuilder};
    use pretty_assertions::assert_eq;

    fn types() -> TypeRegistry {
        let mut builder = TypeRegistryBuilder::new();
        builder.add_class("com.acme.Order").done().unwrap();
        builder.build()
    }

    fn descriptor(definitions: &ConstraintDefinitions, annotation: Annotation) -> Arc<ConstraintDescriptor> {
        let context = DescriptorContext::new("com.acme.Order", ElementKind::Property);
        Arc::new(
            DescriptorBuilder::new(definitions, &types())
                .build(&annotation, &context)
                .unwrap(),
        )
    }

    // ========== TEST: validator_initialized_once_per_descriptor ==========
    #[test]
    fn test_validator_initialized_once_per_descriptor() {
        // GIVEN two descriptors of the same definition
        let definitions = ConstraintDefinitions::with_builtins();
        let factory = ConstraintValidatorFactory::new(ConstraintValidators::with_builtins());
        let first = descriptor(&definitions, builtin::size(1, 3));
        let second = descriptor(&definitions, builtin::size(2, 4));

        // WHEN asking for validators repeatedly
        let a = factory.validator_for(&first).unwrap().unwrap();
        let b = factory.validator_for(&first).unwrap().unwrap();
        let c = factory.validator_for(&second).unwrap().unwrap();

        // THEN each descriptor has its own cached validator
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(factory.len(), 2);

        factory.clear();
        assert!(factory.is_empty());
    }

    #[test]
    fn test_unregistered_definition_has_no_validator() {
        let mut definitions = ConstraintDefinitions::with_builtins();
        definitions
            .register(ConstraintDefinition::new("com.acme.Checksum").message("bad checksum"))
            .unwrap();
        let factory = ConstraintValidatorFactory::new(ConstraintValidators::with_builtins());

        let result = factory.validator_for(&descriptor(&definitions, Annotation::new("com.acme.Checksum")));

        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_initialization_failure() {
        let definitions = ConstraintDefinitions::with_builtins();
        let factory = ConstraintValidatorFactory::new(ConstraintValidators::with_builtins());

        let result = factory.validator_for(&descriptor(&definitions, builtin::pattern("[unclosed")));

        assert!(result.is_err());
        assert!(factory.is_empty());
    }
}
