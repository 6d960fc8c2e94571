//! Dynamic default group sequences.

use beanval_core::{BeanRef, TypeName};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A sequence provider could not compute the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SequenceProviderError(pub String);

/// Computes a bean's default group sequence from the bean instance.
///
/// The instance is absent when validating a value without a bean, for
/// example in `validate_value`.
pub trait DefaultGroupSequenceProvider: Send + Sync {
    fn validation_groups(
        &self,
        bean: Option<&BeanRef>,
    ) -> Result<Vec<TypeName>, SequenceProviderError>;
}

impl<F> DefaultGroupSequenceProvider for F
where
    F: Fn(Option<&BeanRef>) -> Vec<TypeName> + Send + Sync,
{
    fn validation_groups(
        &self,
        bean: Option<&BeanRef>,
    ) -> Result<Vec<TypeName>, SequenceProviderError> {
        Ok(self(bean))
    }
}

/// A registered provider together with the key it was registered under.
#[derive(Clone)]
pub struct SequenceProviderRef {
    key: String,
    provider: Arc<dyn DefaultGroupSequenceProvider>,
}

impl SequenceProviderRef {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn validation_groups(
        &self,
        bean: Option<&BeanRef>,
    ) -> Result<Vec<TypeName>, SequenceProviderError> {
        self.provider.validation_groups(bean)
    }
}

impl fmt::Debug for SequenceProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SequenceProvider({})", self.key)
    }
}

/// Sequence providers by key. `GroupSequenceProvider` annotations and
/// mappings name a key registered here.
#[derive(Clone, Default)]
pub struct SequenceProviders {
    providers: HashMap<String, Arc<dyn DefaultGroupSequenceProvider>>,
}

impl SequenceProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any provider with the same key.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        provider: impl DefaultGroupSequenceProvider + 'static,
    ) {
        self.providers.insert(key.into(), Arc::new(provider));
    }

    pub fn get(&self, key: &str) -> Option<SequenceProviderRef> {
        self.providers.get(key).map(|provider| SequenceProviderRef {
            key: key.to_string(),
            provider: Arc::clone(provider),
        })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for SequenceProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.providers.keys().collect();
        keys.sort();
        f.debug_struct("SequenceProviders").field("keys", &keys).finish()
    }
}
