//! Beanval Groups
//!
//! Turns the groups requested for a validation call into a validation
//! order: flat groups validated one after another, and group sequences
//! whose later groups are skipped once an earlier one fails.
//!
//! Responsibilities:
//! - Expand `GroupSequence` interfaces recursively, rejecting cycles
//! - Add the inherited groups (super-interfaces) of each group
//! - Expand a bean's redefined default group sequence
//! - Cache resolved sequences for the lifetime of the generator

mod error;
mod generator;
mod group;
mod order;

pub use error::{GroupError, GroupResult};
pub use generator::ValidationOrderGenerator;
pub use group::{Group, GroupWithInheritance, Sequence};
pub use order::ValidationOrder;
