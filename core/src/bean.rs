//! The bean object model.
//!
//! A bean is any object the engine can validate: it reports its declared
//! type and hands out property values by name. `BeanRef` is the shared
//! handle the engine passes around; its equality is identity, never
//! structural, so traversal never calls into user-defined comparisons.

use crate::{BeanIdentity, TypeName, Value};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An object that can be validated.
pub trait Bean: Send + Sync {
    /// The declared type of this bean.
    fn bean_type(&self) -> &TypeName;

    /// The current value of a property (field or getter), if the bean has it.
    fn property(&self, name: &str) -> Option<Value>;
}

/// Shared, identity-compared handle to a bean.
#[derive(Clone)]
pub struct BeanRef(Arc<dyn Bean>);

impl BeanRef {
    /// Wrap a bean.
    pub fn new(bean: impl Bean + 'static) -> Self {
        Self(Arc::new(bean))
    }

    /// Wrap an already shared bean.
    pub fn from_arc(bean: Arc<dyn Bean>) -> Self {
        Self(bean)
    }

    /// Identity of the referenced allocation.
    pub fn identity(&self) -> BeanIdentity {
        BeanIdentity(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// Returns true if both handles point at the same bean.
    pub fn ptr_eq(&self, other: &BeanRef) -> bool {
        self.identity() == other.identity()
    }

    /// The declared type of the referenced bean.
    pub fn bean_type(&self) -> &TypeName {
        self.0.bean_type()
    }

    /// Read a property; missing properties read as `Null`.
    pub fn property(&self, name: &str) -> Value {
        self.0.property(name).unwrap_or(Value::Null)
    }
}

impl PartialEq for BeanRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for BeanRef {}

// Beans may form cycles; never print their contents.
impl fmt::Debug for BeanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.bean_type(), self.identity())
    }
}

impl<B: Bean + 'static> From<Arc<B>> for BeanRef {
    fn from(bean: Arc<B>) -> Self {
        Self(bean)
    }
}

/// A bean whose properties live in a map.
///
/// Properties can be set after the bean is shared, which is what makes
/// cyclic object graphs constructible.
pub struct DynamicBean {
    bean_type: TypeName,
    properties: RwLock<BTreeMap<String, Value>>,
}

impl DynamicBean {
    /// Create an empty bean of the given type.
    pub fn new(bean_type: impl Into<TypeName>) -> Self {
        Self {
            bean_type: bean_type.into(),
            properties: RwLock::new(BTreeMap::new()),
        }
    }

    /// Builder-style property assignment.
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.write().insert(name.into(), value.into());
        self
    }

    /// Set a property on a possibly shared bean.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.write().insert(name.into(), value.into());
    }

    /// Wrap into a `BeanRef`.
    pub fn into_ref(self) -> BeanRef {
        BeanRef::new(self)
    }

    /// Wrap into an `Arc` so the bean can still be mutated after sharing.
    pub fn shared(self) -> Arc<DynamicBean> {
        Arc::new(self)
    }
}

impl Bean for DynamicBean {
    fn bean_type(&self) -> &TypeName {
        &self.bean_type
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.read().get(name).cloned()
    }
}

impl fmt::Debug for DynamicBean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.properties.read().keys().cloned().collect();
        f.debug_struct("DynamicBean")
            .field("bean_type", &self.bean_type)
            .field("properties", &names)
            .finish()
    }
}
