//! The order in which groups and sequences are validated.

use crate::{Group, GroupError, GroupResult, Sequence};
use beanval_core::TypeName;
use std::sync::Arc;

/// Flat groups and sequences for one validation call.
///
/// Flat groups are all validated; a sequence stops at its first step that
/// produced violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOrder {
    groups: Vec<Group>,
    sequences: Vec<Arc<Sequence>>,
}

impl ValidationOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The order validating only `Default`.
    pub fn default_group() -> Self {
        let mut order = Self::new();
        order.insert_group(Group::default_group());
        order
    }

    /// Add a flat group unless already present.
    pub fn insert_group(&mut self, group: Group) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    /// Add a sequence unless one with the same name is already present.
    pub fn insert_sequence(&mut self, sequence: Arc<Sequence>) {
        if !self.sequences.iter().any(|s| s.name() == sequence.name()) {
            self.sequences.push(sequence);
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn sequences(&self) -> &[Arc<Sequence>] {
        &self.sequences
    }

    /// Returns true if this is exactly the `Default` order.
    pub fn is_default_group_only(&self) -> bool {
        self.sequences.is_empty() && self.groups.len() == 1 && self.groups[0].is_default_group()
    }

    /// Check that every requested sequence containing `Default` can take a
    /// bean's redefined default sequence in place of `Default`.
    ///
    /// A group of the default sequence that also occurs in the requested
    /// sequence is only allowed as the head of the default sequence placed
    /// directly before `Default`, or as its tail placed directly after.
    pub fn assert_default_group_sequence_is_expandable(
        &self,
        default_sequence: &[TypeName],
    ) -> GroupResult<()> {
        for sequence in &self.sequences {
            let groups = sequence.composing_groups();
            let Some(default_index) = groups.iter().position(Group::is_default_group) else {
                continue;
            };

            let last = default_sequence.len().saturating_sub(1);
            for (i, name) in default_sequence.iter().enumerate() {
                if name.is_default_group() {
                    continue;
                }
                let Some(index) = groups.iter().position(|g| g.defining_type() == name) else {
                    continue;
                };
                let before = i == 0 && index + 1 == default_index;
                let after = i == last && index == default_index + 1;
                if before || after {
                    continue;
                }
                return Err(GroupError::UnableToExpandDefaultSequence {
                    default_sequence: default_sequence
                        .iter()
                        .map(|g| g.simple_name().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    sequence: sequence.to_string(),
                    group: name.to_string(),
                });
            }
        }
        Ok(())
    }
}
