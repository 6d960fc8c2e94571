//! Well-known names shared across the engine.
//!
//! These constants keep annotation and node names consistent between the
//! metadata providers, the validation engine and the linter.

/// The built-in `Default` group interface.
pub const DEFAULT_GROUP: &str = "beanval.groups.Default";

/// Marks a property, parameter or return value for cascaded validation.
pub const VALID: &str = "beanval.Valid";

/// Converts one group into another when cascading. Attributes: `from`, `to`.
pub const CONVERT_GROUP: &str = "beanval.groups.ConvertGroup";

/// Declares a group sequence (on an interface) or redefines the default
/// group sequence (on a class). Attribute: `value`.
pub const GROUP_SEQUENCE: &str = "beanval.GroupSequence";

/// Names a registered default group sequence provider. Attribute: `value`.
pub const GROUP_SEQUENCE_PROVIDER: &str = "beanval.GroupSequenceProvider";

/// Controls unwrapping of value wrappers such as `Optional`. Attribute: `value`.
pub const UNWRAP_VALIDATED_VALUE: &str = "beanval.UnwrapValidatedValue";

/// Node name used for cross-parameter constraints.
pub const CROSS_PARAMETER_NODE: &str = "<cross-parameter>";

/// Node name used for return values.
pub const RETURN_VALUE_NODE: &str = "<return value>";

/// Node name used for list elements.
pub const LIST_ELEMENT_NODE: &str = "<list element>";

/// Node name used for set and other iterable elements.
pub const ITERABLE_ELEMENT_NODE: &str = "<iterable element>";

/// Node name used for map values.
pub const MAP_VALUE_NODE: &str = "<map value>";

/// Node name used for the content of an optional value.
pub const OPTIONAL_ELEMENT_NODE: &str = "<optional element>";
