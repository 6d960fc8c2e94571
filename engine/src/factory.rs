//! Validator factory.
//!
//! A `ValidatorFactory` owns everything validators share: the type
//! registry, the constraint definitions, the metadata cache, the group
//! order cache and the initialized constraint validators. Validators are
//! cheap handles onto that state and may be used from many threads.

use crate::constraint::{ConstraintValidator, ConstraintValidatorFactory, ConstraintValidators};
use crate::interpolator::{MessageInterpolator, ParameterMessageInterpolator};
use crate::resolver::{TraversableResolver, TraverseAll};
use crate::{ValidationError, ValidationResult, Validator, ValidatorConfig};
use beanval_core::TypeName;
use beanval_descriptor::{ConstraintDefinition, ConstraintDefinitions};
use beanval_groups::ValidationOrderGenerator;
use beanval_metadata::{
    AnnotationMetaDataProvider, BeanMetaData, BeanMetaDataManager, ConstraintMapping,
    DefaultGroupSequenceProvider, MappingMetaDataProvider, MetaDataProvider,
    ProgrammaticMetaDataProvider, SequenceProviders,
};
use beanval_types::TypeRegistry;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// State shared by a factory and all validators it hands out.
pub(crate) struct FactoryState {
    pub types: Arc<TypeRegistry>,
    pub definitions: Arc<ConstraintDefinitions>,
    pub manager: BeanMetaDataManager,
    pub generator: ValidationOrderGenerator,
    pub validators: ConstraintValidatorFactory,
    pub config: ValidatorConfig,
    pub interpolator: Arc<dyn MessageInterpolator>,
    pub resolver: Arc<dyn TraversableResolver>,
}

/// Configures and builds a `ValidatorFactory`.
pub struct ValidatorFactoryBuilder {
    types: Arc<TypeRegistry>,
    definitions: ConstraintDefinitions,
    validators: ConstraintValidators,
    sequence_providers: SequenceProviders,
    mappings: Vec<ConstraintMapping>,
    json_mappings: Vec<String>,
    config: ValidatorConfig,
    interpolator: Arc<dyn MessageInterpolator>,
    resolver: Arc<dyn TraversableResolver>,
    error: Option<ValidationError>,
}

impl ValidatorFactoryBuilder {
    fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            types,
            definitions: ConstraintDefinitions::with_builtins(),
            validators: ConstraintValidators::with_builtins(),
            sequence_providers: SequenceProviders::new(),
            mappings: Vec::new(),
            json_mappings: Vec::new(),
            config: ValidatorConfig::default(),
            interpolator: Arc::new(ParameterMessageInterpolator::new()),
            resolver: Arc::new(TraverseAll),
            error: None,
        }
    }

    /// Register a custom constraint definition. An invalid definition is
    /// reported by `build`.
    pub fn constraint_definition(mut self, definition: ConstraintDefinition) -> Self {
        if let Err(e) = self.definitions.register(definition) {
            self.error.get_or_insert(e.into());
        }
        self
    }

    /// Register the validator of a generic constraint.
    pub fn validator<F, V>(mut self, constraint: impl Into<TypeName>, constructor: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: ConstraintValidator + 'static,
    {
        self.validators.register(constraint, constructor);
        self
    }

    /// Register the validator of a cross-parameter constraint.
    pub fn cross_parameter_validator<F, V>(mut self, constraint: impl Into<TypeName>, constructor: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: ConstraintValidator + 'static,
    {
        self.validators.register_cross_parameter(constraint, constructor);
        self
    }

    /// Register a default group sequence provider under the key that
    /// annotations and mappings refer to.
    pub fn sequence_provider(
        mut self,
        key: impl Into<String>,
        provider: impl DefaultGroupSequenceProvider + 'static,
    ) -> Self {
        self.sequence_providers.register(key, provider);
        self
    }

    /// Add a programmatic constraint mapping.
    pub fn mapping(mut self, mapping: ConstraintMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Add a JSON constraint mapping document.
    pub fn json_mapping(mut self, document: impl Into<String>) -> Self {
        self.json_mappings.push(document.into());
        self
    }

    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    pub fn message_interpolator(mut self, interpolator: impl MessageInterpolator + 'static) -> Self {
        self.interpolator = Arc::new(interpolator);
        self
    }

    pub fn traversable_resolver(mut self, resolver: impl TraversableResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Build the factory. Mappings are read here, and the metadata of the
    /// configured predefined types is built eagerly.
    pub fn build(self) -> ValidationResult<ValidatorFactory> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let definitions = Arc::new(self.definitions);
        let sequence_providers = Arc::new(self.sequence_providers);

        let mut providers: Vec<Box<dyn MetaDataProvider>> = Vec::new();
        if !self.json_mappings.is_empty() {
            providers.push(Box::new(MappingMetaDataProvider::from_json(
                &self.types,
                &definitions,
                &sequence_providers,
                &self.json_mappings,
            )?));
        }
        if !self.mappings.is_empty() {
            providers.push(Box::new(ProgrammaticMetaDataProvider::new(
                &self.types,
                &definitions,
                &sequence_providers,
                &self.mappings,
            )?));
        }

        let annotations = AnnotationMetaDataProvider::new(
            Arc::clone(&self.types),
            Arc::clone(&definitions),
            Arc::clone(&sequence_providers),
        );
        let manager = BeanMetaDataManager::new(
            Arc::clone(&self.types),
            annotations,
            providers,
            self.config.method_validation,
        );
        manager.preload(self.config.predefined_types.iter().map(String::as_str))?;

        debug!(
            definitions = definitions.len(),
            validators = self.validators.len(),
            mappings = self.mappings.len() + self.json_mappings.len(),
            preloaded = manager.len(),
            fail_fast = self.config.fail_fast,
            "built validator factory"
        );

        Ok(ValidatorFactory {
            state: Arc::new(FactoryState {
                generator: ValidationOrderGenerator::new(Arc::clone(&self.types)),
                types: self.types,
                definitions,
                manager,
                validators: ConstraintValidatorFactory::new(self.validators),
                config: self.config,
                interpolator: self.interpolator,
                resolver: self.resolver,
            }),
        })
    }
}

/// Hands out validators sharing one metadata cache.
#[derive(Clone)]
pub struct ValidatorFactory {
    state: Arc<FactoryState>,
}

impl ValidatorFactory {
    pub fn builder(types: impl Into<Arc<TypeRegistry>>) -> ValidatorFactoryBuilder {
        ValidatorFactoryBuilder::new(types.into())
    }

    /// A validator with the factory's settings.
    pub fn validator(&self) -> Validator {
        self.using_context().validator()
    }

    /// Start configuring a validator that overrides some factory settings.
    pub fn using_context(&self) -> ValidatorContext {
        ValidatorContext {
            state: Arc::clone(&self.state),
            fail_fast: self.state.config.fail_fast,
            interpolator: Arc::clone(&self.state.interpolator),
            resolver: Arc::clone(&self.state.resolver),
        }
    }

    pub fn bean_meta_data(&self, bean_type: impl Into<TypeName>) -> ValidationResult<Arc<BeanMetaData>> {
        Ok(self.state.manager.bean_meta_data(&bean_type.into())?)
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.state.types
    }

    pub fn constraint_definitions(&self) -> &ConstraintDefinitions {
        &self.state.definitions
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.state.config
    }

    /// Number of types with cached metadata.
    pub fn cached_types(&self) -> usize {
        self.state.manager.len()
    }

    /// Drop all cached metadata, group orders and initialized validators.
    pub fn clear(&self) {
        self.state.manager.clear();
        self.state.generator.clear();
        self.state.validators.clear();
        debug!("cleared validator factory caches");
    }
}

impl fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorFactory")
            .field("types", &self.state.types.len())
            .field("definitions", &self.state.definitions.len())
            .field("metadata", &self.state.manager)
            .field("validators", &self.state.validators)
            .field("config", &self.state.config)
            .finish()
    }
}

/// A validator configuration derived from a factory.
pub struct ValidatorContext {
    state: Arc<FactoryState>,
    fail_fast: bool,
    interpolator: Arc<dyn MessageInterpolator>,
    resolver: Arc<dyn TraversableResolver>,
}

impl ValidatorContext {
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn message_interpolator(mut self, interpolator: impl MessageInterpolator + 'static) -> Self {
        self.interpolator = Arc::new(interpolator);
        self
    }

    pub fn traversable_resolver(mut self, resolver: impl TraversableResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn validator(self) -> Validator {
        Validator::new(self.state, self.fail_fast, self.interpolator, self.resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanval_descriptor::builtin;
    use beanval_metadata::MetaDataError;
    use beanval_types::{PropertyDef, TypeRegistryBuilder, ValueType};
    use pretty_assertions::assert_eq;

    fn types() -> TypeRegistry {
        let mut builder = TypeRegistryBuilder::new();
        builder
            .add_class("com.acme.Order")
            .property(PropertyDef::new("id", ValueType::named("String")).annotate(builtin::not_null()))
            .done()
            .unwrap();
        builder.add_class("com.acme.Note").done().unwrap();
        builder.build()
    }

    // ========== TEST: predefined_types_are_preloaded ==========
    #[test]
    fn test_predefined_types_are_preloaded() {
        // GIVEN a configuration naming one predefined type
        let config = ValidatorConfig::new().with_predefined_types(["com.acme.Order"]);

        // WHEN building the factory
        let factory = ValidatorFactory::builder(types()).config(config).build().unwrap();

        // THEN its metadata is cached before any validation
        assert_eq!(factory.cached_types(), 1);
        assert!(factory.bean_meta_data("com.acme.Order").unwrap().has_constraints());

        factory.clear();
        assert_eq!(factory.cached_types(), 0);
    }

    // ========== TEST: unknown_predefined_type ==========
    #[test]
    fn test_unknown_predefined_type() {
        let config = ValidatorConfig::new().with_predefined_types(["com.acme.Missing"]);

        let result = ValidatorFactory::builder(types()).config(config).build();

        assert!(matches!(
            result,
            Err(ValidationError::MetaData(MetaDataError::UnknownType { .. }))
        ));
    }

    #[test]
    fn test_invalid_definition_reported_on_build() {
        // Built-in definitions cannot be redefined
        let result = ValidatorFactory::builder(types())
            .constraint_definition(ConstraintDefinition::new(builtin::NOT_NULL))
            .build();

        assert!(matches!(result, Err(ValidationError::Descriptor(_))));
    }

    #[test]
    fn test_context_overrides_fail_fast() {
        let factory = ValidatorFactory::builder(types()).fail_fast(true).build().unwrap();

        assert!(factory.validator().is_fail_fast());
        assert!(!factory.using_context().fail_fast(false).validator().is_fail_fast());
        assert!(!factory.bean_meta_data("com.acme.Note").unwrap().has_constraints());
    }
}
