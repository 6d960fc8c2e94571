//! The bean metadata cache.

use crate::provider::{AnnotationMetaDataProvider, MetaDataProvider};
use crate::{
    AnnotationProcessingOptions, BeanMetaData, ConfigurationSource, MetaDataError, MetaDataResult,
    MethodValidationConfig,
};
use beanval_core::TypeName;
use beanval_types::{TypeId, TypeRegistry};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Builds and caches `BeanMetaData` per type.
///
/// The annotation provider always runs first; additional providers follow
/// in registration order and add to what it declares. Metadata is built
/// outside the lock. When two threads build the same type concurrently the
/// first published instance wins and every caller gets that instance.
pub struct BeanMetaDataManager {
    types: Arc<TypeRegistry>,
    providers: Vec<Box<dyn MetaDataProvider>>,
    options: AnnotationProcessingOptions,
    method_config: MethodValidationConfig,
    cache: RwLock<HashMap<TypeId, Arc<BeanMetaData>>>,
}

impl BeanMetaDataManager {
    pub fn new(
        types: Arc<TypeRegistry>,
        annotation_provider: AnnotationMetaDataProvider,
        additional_providers: Vec<Box<dyn MetaDataProvider>>,
        method_config: MethodValidationConfig,
    ) -> Self {
        let mut options = AnnotationProcessingOptions::new();
        for provider in &additional_providers {
            options.merge(&provider.annotation_processing_options());
        }

        let mut providers: Vec<Box<dyn MetaDataProvider>> = Vec::with_capacity(additional_providers.len() + 1);
        providers.push(Box::new(annotation_provider));
        providers.extend(additional_providers);

        Self {
            types,
            providers,
            options,
            method_config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    pub fn method_validation_config(&self) -> &MethodValidationConfig {
        &self.method_config
    }

    /// The metadata of a type, built on first access.
    pub fn bean_meta_data(&self, name: &TypeName) -> MetaDataResult<Arc<BeanMetaData>> {
        let type_id = self
            .types
            .type_id(name)
            .ok_or_else(|| MetaDataError::unknown_type(name.as_str()))?;
        self.bean_meta_data_by_id(type_id)
    }

    pub fn bean_meta_data_by_id(&self, type_id: TypeId) -> MetaDataResult<Arc<BeanMetaData>> {
        if let Some(meta) = self.cache.read().get(&type_id) {
            trace!(bean = %meta.bean_type(), "metadata cache hit");
            return Ok(Arc::clone(meta));
        }

        let built = Arc::new(self.build(type_id)?);

        let mut cache = self.cache.write();
        let published = cache.entry(type_id).or_insert_with(|| Arc::clone(&built));
        if Arc::ptr_eq(published, &built) {
            debug!(
                bean = %built.bean_type(),
                constrained = built.has_constraints(),
                "published bean metadata"
            );
        } else {
            warn!(bean = %built.bean_type(), "concurrent metadata build discarded");
        }
        Ok(Arc::clone(published))
    }

    /// Build the metadata of the given types eagerly.
    pub fn preload<I, T>(&self, names: I) -> MetaDataResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        for name in names {
            self.bean_meta_data(&name.into())?;
        }
        Ok(())
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Drop all cached metadata.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    fn build(&self, type_id: TypeId) -> MetaDataResult<BeanMetaData> {
        let mut configurations = Vec::new();
        for id in self.types.hierarchy(type_id) {
            let Some(type_def) = self.types.get_type(id) else {
                continue;
            };
            for provider in &self.providers {
                if let Some(mut config) = provider.bean_configuration(type_def)? {
                    if config.source == ConfigurationSource::Annotation {
                        self.options.apply(&mut config);
                    }
                    configurations.push(config);
                }
            }
        }
        BeanMetaData::build(&self.types, type_id, configurations, &self.method_config)
    }
}

impl fmt::Debug for BeanMetaDataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanMetaDataManager")
            .field("providers", &self.providers.len())
            .field("cached", &self.len())
            .field("method_config", &self.method_config)
            .finish()
    }
}
