//! Property paths.
//!
//! A path is the sequence of nodes leading from the validated root to the
//! element a violation was reported on, e.g. `orders[2].customer.name`.
//! Paths are values: every `with_*`/`add_*` method returns a new path, so
//! sibling branches of a traversal never see each other's segments.

use crate::{CoreError, CoreResult};
use std::fmt;

/// Kind of a path node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Bean,
    Property,
    Method,
    Constructor,
    Parameter,
    CrossParameter,
    ReturnValue,
    ContainerElement,
}

/// Position of an element inside its container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    Index(usize),
    Key(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Index(i) => write!(f, "{}", i),
            NodeKey::Key(k) => write!(f, "{}", k),
        }
    }
}

/// One segment of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub kind: NodeKind,
    /// Property, executable or parameter name. Bean nodes have none.
    pub name: Option<String>,
    /// True when this node was reached through a container element.
    pub in_iterable: bool,
    /// Index or key of that element, when the container has one.
    pub key: Option<NodeKey>,
    /// Parameter position for parameter nodes.
    pub parameter_index: Option<usize>,
}

impl Node {
    fn new(kind: NodeKind, name: Option<String>) -> Self {
        Self {
            kind,
            name,
            in_iterable: false,
            key: None,
            parameter_index: None,
        }
    }

    /// Node name, empty for bean nodes.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Pending container position, applied to the next node added.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ElementMarker {
    key: Option<NodeKey>,
}

/// A property path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    nodes: Vec<Node>,
    element: Option<ElementMarker>,
}

impl Path {
    /// The empty path of the validated root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.nodes.is_empty() && self.element.is_none()
    }

    /// The nodes of this path.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The last node, if any.
    pub fn leaf(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the path has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if the path ends inside a container without naming the element node yet.
    pub fn ends_in_element(&self) -> bool {
        self.element.is_some()
    }

    /// The key of the pending container element, if the path ends in one.
    pub fn element_key(&self) -> Option<&NodeKey> {
        self.element.as_ref().and_then(|m| m.key.as_ref())
    }

    fn push(&self, mut node: Node) -> Self {
        let mut nodes = self.nodes.clone();
        if let Some(marker) = &self.element {
            node.in_iterable = true;
            node.key = marker.key.clone();
        }
        nodes.push(node);
        Self {
            nodes,
            element: None,
        }
    }

    /// Append a property node.
    pub fn add_property(&self, name: impl Into<String>) -> Self {
        self.push(Node::new(NodeKind::Property, Some(name.into())))
    }

    /// Append a bean node (used for class-level constraints).
    pub fn add_bean(&self) -> Self {
        self.push(Node::new(NodeKind::Bean, None))
    }

    /// Append a method node.
    pub fn add_method(&self, name: impl Into<String>) -> Self {
        self.push(Node::new(NodeKind::Method, Some(name.into())))
    }

    /// Append a constructor node.
    pub fn add_constructor(&self, name: impl Into<String>) -> Self {
        self.push(Node::new(NodeKind::Constructor, Some(name.into())))
    }

    /// Append a parameter node.
    pub fn add_parameter(&self, name: impl Into<String>, index: usize) -> Self {
        let mut node = Node::new(NodeKind::Parameter, Some(name.into()));
        node.parameter_index = Some(index);
        self.push(node)
    }

    /// Append the cross-parameter node.
    pub fn add_cross_parameter(&self) -> Self {
        self.push(Node::new(
            NodeKind::CrossParameter,
            Some(crate::names::CROSS_PARAMETER_NODE.to_string()),
        ))
    }

    /// Append the return value node.
    pub fn add_return_value(&self) -> Self {
        self.push(Node::new(
            NodeKind::ReturnValue,
            Some(crate::names::RETURN_VALUE_NODE.to_string()),
        ))
    }

    /// Append a container element node such as `<list element>`.
    pub fn add_container_element(&self, name: impl Into<String>) -> Self {
        self.push(Node::new(NodeKind::ContainerElement, Some(name.into())))
    }

    /// Step into an element of the container the path currently points at.
    /// The key is attached to the next node added.
    pub fn enter_element(&self, key: Option<NodeKey>) -> Self {
        Self {
            nodes: self.nodes.clone(),
            element: Some(ElementMarker { key }),
        }
    }

    /// True if `self` is `other` or extends it.
    pub fn starts_with(&self, other: &Path) -> bool {
        if other.nodes.len() > self.nodes.len() {
            return false;
        }
        if !self.nodes.iter().zip(other.nodes.iter()).all(|(a, b)| a == b) {
            return false;
        }
        match &other.element {
            None => true,
            Some(marker) => match self.nodes.get(other.nodes.len()) {
                Some(next) => next.in_iterable && next.key == marker.key,
                None => self.element.as_ref() == Some(marker),
            },
        }
    }

    /// Parse a dotted property path such as `orders[0].customer.name`.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid_property_path(input, "path is empty"));
        }

        let mut path = Path::root();
        let mut chars = trimmed.chars().peekable();
        let mut expect_name = true;

        while let Some(&c) = chars.peek() {
            if expect_name {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(CoreError::invalid_property_path(
                        input,
                        format!("expected a property name, found '{}'", c),
                    ));
                }
                path = path.add_property(name);
                expect_name = false;
                continue;
            }

            match c {
                '.' => {
                    chars.next();
                    expect_name = true;
                }
                '[' => {
                    chars.next();
                    let mut content = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        content.push(c);
                    }
                    if !closed {
                        return Err(CoreError::invalid_property_path(input, "unclosed '['"));
                    }
                    let key = if content.is_empty() {
                        None
                    } else if let Ok(index) = content.parse::<usize>() {
                        Some(NodeKey::Index(index))
                    } else {
                        Some(NodeKey::Key(content))
                    };
                    path = path.enter_element(key);
                }
                other => {
                    return Err(CoreError::invalid_property_path(
                        input,
                        format!("unexpected character '{}'", other),
                    ));
                }
            }
        }

        if expect_name {
            return Err(CoreError::invalid_property_path(input, "path ends with '.'"));
        }
        Ok(path)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut written = false;
        for node in &self.nodes {
            if node.in_iterable {
                match &node.key {
                    Some(key) => write!(f, "[{}]", key)?,
                    None => write!(f, "[]")?,
                }
                written = true;
            }
            if let Some(name) = &node.name {
                if written {
                    write!(f, ".")?;
                }
                write!(f, "{}", name)?;
                written = true;
            }
        }
        if let Some(marker) = &self.element {
            match &marker.key {
                Some(key) => write!(f, "[{}]", key)?,
                None => write!(f, "[]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== TEST: display_nested_path ==========
    #[test]
    fn test_display_nested_path() {
        // GIVEN a path built while cascading into a list element
        let path = Path::root()
            .add_property("orders")
            .enter_element(Some(NodeKey::Index(2)))
            .add_property("customer")
            .add_property("name");

        // THEN it renders with the index attached to the container
        assert_eq!(path.to_string(), "orders[2].customer.name");
    }

    // ========== TEST: class_level_node_on_element ==========
    #[test]
    fn test_class_level_node_on_element() {
        let path = Path::root()
            .add_property("addresses")
            .enter_element(Some(NodeKey::Key("home".into())))
            .add_bean();

        assert_eq!(path.to_string(), "addresses[home]");
        assert_eq!(path.leaf().map(|n| n.kind), Some(NodeKind::Bean));
    }

    // ========== TEST: branching_does_not_leak ==========
    #[test]
    fn test_branching_does_not_leak() {
        // GIVEN a shared parent path
        let parent = Path::root().add_property("customer");

        // WHEN two children branch from it
        let left = parent.add_property("name");
        let right = parent.add_property("email");

        // THEN neither sees the other's segment
        assert_eq!(parent.to_string(), "customer");
        assert_eq!(left.to_string(), "customer.name");
        assert_eq!(right.to_string(), "customer.email");
    }

    // ========== TEST: parse_path ==========
    #[test]
    fn test_parse_path() {
        let path = Path::parse("orders[0].items[sku-1].price").unwrap();

        assert_eq!(path.len(), 3);
        assert_eq!(path.nodes()[1].key, Some(NodeKey::Index(0)));
        assert!(path.nodes()[1].in_iterable);
        assert_eq!(path.nodes()[2].key, Some(NodeKey::Key("sku-1".into())));
        assert_eq!(path.to_string(), "orders[0].items[sku-1].price");
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        assert!(Path::parse("").is_err());
        assert!(Path::parse("a..b").is_err());
        assert!(Path::parse("a.").is_err());
        assert!(Path::parse("a[0").is_err());
        assert!(Path::parse(".a").is_err());
    }

    #[test]
    fn test_starts_with() {
        let base = Path::root().add_property("a");
        let child = base.add_property("b");

        assert!(child.starts_with(&base));
        assert!(!base.starts_with(&child));
        assert!(child.starts_with(&Path::root()));

        let element = base.enter_element(Some(NodeKey::Index(1)));
        assert!(element.add_property("x").starts_with(&element));
        assert!(!base
            .enter_element(Some(NodeKey::Index(2)))
            .add_property("x")
            .starts_with(&element));
    }
}
