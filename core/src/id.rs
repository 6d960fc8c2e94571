//! Identity types for declared types and bean instances.
//!
//! - `TypeName` is the fully qualified name of a class or interface
//! - `TypeId` is the identity of a type within one type registry
//! - `BeanIdentity` is the address-based identity of a live bean instance

use std::fmt;
use std::sync::Arc;

/// Unique identifier for a declared type within one registry.
///
/// Ids are never shared between registries, so caches keyed by `TypeId`
/// cannot confuse two models that happen to declare the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Create a new TypeId from a raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Fully qualified name of a class or interface, e.g. `com.acme.Order`.
///
/// Cheap to clone; names are shared behind an `Arc`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Create a new type name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The built-in `Default` group.
    pub fn default_group() -> Self {
        Self::new(crate::names::DEFAULT_GROUP)
    }

    /// Get the fully qualified name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without the package prefix.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }

    /// Returns true if this names the built-in `Default` group.
    pub fn is_default_group(&self) -> bool {
        &*self.0 == crate::names::DEFAULT_GROUP
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&TypeName> for TypeName {
    fn from(name: &TypeName) -> Self {
        name.clone()
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Address-based identity of a bean instance.
///
/// Two `BeanRef`s pointing at the same allocation have the same identity,
/// regardless of what `PartialEq` on their contents would say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeanIdentity(pub usize);

impl BeanIdentity {
    /// Get the raw address.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BeanIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{:x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_display() {
        let id = TypeId::new(42);
        assert_eq!(format!("{}", id), "t42");
        assert_eq!(id.raw(), 42);
    }

    #[test]
    fn test_type_name_simple_name() {
        assert_eq!(TypeName::new("com.acme.Order").simple_name(), "Order");
        assert_eq!(TypeName::new("Order").simple_name(), "Order");
    }

    #[test]
    fn test_default_group_name() {
        let group = TypeName::default_group();
        assert!(group.is_default_group());
        assert!(!TypeName::new("com.acme.Extended").is_default_group());
    }
}
