//! Groups and sequences.

use beanval_core::TypeName;
use std::fmt;

/// A validation group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    group: TypeName,
}

impl Group {
    pub fn new(group: impl Into<TypeName>) -> Self {
        Self {
            group: group.into(),
        }
    }

    /// The `Default` group.
    pub fn default_group() -> Self {
        Self::new(TypeName::default_group())
    }

    /// The group interface constraints are matched against.
    pub fn defining_type(&self) -> &TypeName {
        &self.group
    }

    pub fn is_default_group(&self) -> bool {
        self.group.is_default_group()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group.simple_name())
    }
}

/// A group of a sequence together with the groups it inherits from.
/// Validated as one step of the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupWithInheritance {
    groups: Vec<Group>,
}

impl GroupWithInheritance {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }
}

impl<'a> IntoIterator for &'a GroupWithInheritance {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// A resolved group sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: TypeName,
    /// Groups after recursive expansion of nested sequences.
    composing: Vec<Group>,
    /// One step per composing group, inherited groups included.
    expanded: Vec<GroupWithInheritance>,
}

impl Sequence {
    pub(crate) fn new(name: TypeName, composing: Vec<Group>) -> Self {
        let expanded = composing
            .iter()
            .map(|g| GroupWithInheritance::new(vec![g.clone()]))
            .collect();
        Self {
            name,
            composing,
            expanded,
        }
    }

    pub(crate) fn set_expanded(&mut self, expanded: Vec<GroupWithInheritance>) {
        self.expanded = expanded;
    }

    /// The sequence interface, or the bean type for a default sequence.
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn composing_groups(&self) -> &[Group] {
        &self.composing
    }

    /// The steps of the sequence in order.
    pub fn steps(&self) -> &[GroupWithInheritance] {
        &self.expanded
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self.composing.iter().map(|g| g.to_string()).collect();
        write!(f, "{}[{}]", self.name.simple_name(), groups.join(", "))
    }
}
