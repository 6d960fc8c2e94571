//! Annotations declared on types, members, parameters and type arguments.

use crate::{names, TypeName};
use std::collections::BTreeMap;
use std::fmt;

/// The value of one annotation attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Strings(Vec<String>),
    Type(TypeName),
    Types(Vec<TypeName>),
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeName> {
        match self {
            AttributeValue::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_types(&self) -> Option<&[TypeName]> {
        match self {
            AttributeValue::Types(types) => Some(types),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Bool(_) => "Bool",
            AttributeValue::Int(_) => "Int",
            AttributeValue::Float(_) => "Float",
            AttributeValue::String(_) => "String",
            AttributeValue::Strings(_) => "Strings",
            AttributeValue::Type(_) => "Type",
            AttributeValue::Types(_) => "Types",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::String(s) => write!(f, "{}", s),
            AttributeValue::Type(t) => write!(f, "{}", t),
            AttributeValue::Strings(items) => write!(f, "[{}]", items.join(", ")),
            AttributeValue::Types(items) => {
                let names: Vec<&str> = items.iter().map(|t| t.as_str()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}

impl From<i32> for AttributeValue {
    fn from(i: i32) -> Self {
        AttributeValue::Int(i as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<TypeName> for AttributeValue {
    fn from(t: TypeName) -> Self {
        AttributeValue::Type(t)
    }
}

impl From<Vec<TypeName>> for AttributeValue {
    fn from(types: Vec<TypeName>) -> Self {
        AttributeValue::Types(types)
    }
}

/// An annotation instance: a type name plus attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: TypeName,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Annotation {
    /// Create an annotation without attributes.
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Restrict the annotation to the given groups.
    pub fn groups<I, T>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        let groups: Vec<TypeName> = groups.into_iter().map(Into::into).collect();
        self.with("groups", groups)
    }

    /// Set the message template.
    pub fn message(self, template: impl Into<String>) -> Self {
        self.with("message", template.into())
    }

    /// Get an attribute by name.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Returns true if this annotation has the given name.
    pub fn is(&self, name: &str) -> bool {
        self.name.as_str() == name
    }

    /// `@Valid`.
    pub fn valid() -> Self {
        Self::new(names::VALID)
    }

    /// `@ConvertGroup(from, to)`.
    pub fn convert_group(from: impl Into<TypeName>, to: impl Into<TypeName>) -> Self {
        Self::new(names::CONVERT_GROUP)
            .with("from", from.into())
            .with("to", to.into())
    }

    /// `@GroupSequence({...})`.
    pub fn group_sequence<I, T>(groups: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        let groups: Vec<TypeName> = groups.into_iter().map(Into::into).collect();
        Self::new(names::GROUP_SEQUENCE).with("value", groups)
    }

    /// `@GroupSequenceProvider(key)`; the key names a registered provider.
    pub fn group_sequence_provider(key: impl Into<String>) -> Self {
        Self::new(names::GROUP_SEQUENCE_PROVIDER).with("value", key.into())
    }

    /// `@UnwrapValidatedValue(unwrap)`.
    pub fn unwrap_validated_value(unwrap: bool) -> Self {
        Self::new(names::UNWRAP_VALIDATED_VALUE).with("value", unwrap)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name.simple_name())?;
        if !self.attributes.is_empty() {
            let parts: Vec<String> = self
                .attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, "({})", parts.join(", "))?;
        }
        Ok(())
    }
}
