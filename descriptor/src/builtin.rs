//! Built-in constraint definitions and annotation shorthands.

use crate::{AttributeKind, ComposingConstraint, ConstraintDefinition};
use beanval_core::Annotation;

pub const NOT_NULL: &str = "beanval.constraints.NotNull";
pub const NULL: &str = "beanval.constraints.Null";
pub const NOT_EMPTY: &str = "beanval.constraints.NotEmpty";
pub const NOT_BLANK: &str = "beanval.constraints.NotBlank";
pub const SIZE: &str = "beanval.constraints.Size";
pub const MIN: &str = "beanval.constraints.Min";
pub const MAX: &str = "beanval.constraints.Max";
pub const PATTERN: &str = "beanval.constraints.Pattern";
pub const ASSERT_TRUE: &str = "beanval.constraints.AssertTrue";
pub const ASSERT_FALSE: &str = "beanval.constraints.AssertFalse";
pub const RANGE: &str = "beanval.constraints.Range";

/// All built-in definitions, composing constraints first.
pub fn definitions() -> Vec<ConstraintDefinition> {
    vec![
        ConstraintDefinition::new(NOT_NULL).message("must not be null"),
        ConstraintDefinition::new(NULL).message("must be null"),
        ConstraintDefinition::new(NOT_EMPTY).message("must not be empty"),
        ConstraintDefinition::new(NOT_BLANK).message("must not be blank"),
        ConstraintDefinition::new(SIZE)
            .attribute("min", AttributeKind::Int, 0)
            .attribute("max", AttributeKind::Int, i64::MAX)
            .message("size must be between {min} and {max}"),
        ConstraintDefinition::new(MIN)
            .required_attribute("value", AttributeKind::Int)
            .message("must be greater than or equal to {value}"),
        ConstraintDefinition::new(MAX)
            .required_attribute("value", AttributeKind::Int)
            .message("must be less than or equal to {value}"),
        ConstraintDefinition::new(PATTERN)
            .required_attribute("regexp", AttributeKind::String)
            .message("must match \"{regexp}\""),
        ConstraintDefinition::new(ASSERT_TRUE).message("must be true"),
        ConstraintDefinition::new(ASSERT_FALSE).message("must be false"),
        ConstraintDefinition::new(RANGE)
            .attribute("min", AttributeKind::Int, 0)
            .attribute("max", AttributeKind::Int, i64::MAX)
            .message("must be between {min} and {max}")
            .composed_of(
                ComposingConstraint::new(Annotation::new(MIN).with("value", 0))
                    .override_attribute("min", "value"),
            )
            .composed_of(
                ComposingConstraint::new(Annotation::new(MAX).with("value", i64::MAX))
                    .override_attribute("max", "value"),
            )
            .report_as_single_violation(),
    ]
}

/// `@NotNull`
pub fn not_null() -> Annotation {
    Annotation::new(NOT_NULL)
}

/// `@Null`
pub fn null() -> Annotation {
    Annotation::new(NULL)
}

/// `@NotEmpty`
pub fn not_empty() -> Annotation {
    Annotation::new(NOT_EMPTY)
}

/// `@NotBlank`
pub fn not_blank() -> Annotation {
    Annotation::new(NOT_BLANK)
}

/// `@Size(min, max)`
pub fn size(min: i64, max: i64) -> Annotation {
    Annotation::new(SIZE).with("min", min).with("max", max)
}

/// `@Min(value)`
pub fn min(value: i64) -> Annotation {
    Annotation::new(MIN).with("value", value)
}

/// `@Max(value)`
pub fn max(value: i64) -> Annotation {
    Annotation::new(MAX).with("value", value)
}

/// `@Pattern(regexp)`
pub fn pattern(regexp: &str) -> Annotation {
    Annotation::new(PATTERN).with("regexp", regexp)
}

/// `@AssertTrue`
pub fn assert_true() -> Annotation {
    Annotation::new(ASSERT_TRUE)
}

/// `@AssertFalse`
pub fn assert_false() -> Annotation {
    Annotation::new(ASSERT_FALSE)
}

/// `@Range(min, max)`
pub fn range(min: i64, max: i64) -> Annotation {
    Annotation::new(RANGE).with("min", min).with("max", max)
}
