//! Validators for the built-in constraints.
//!
//! `Null` values are valid for every constraint except `NotNull`,
//! `NotEmpty` and `NotBlank`. `Range` is composed of `Min` and `Max` and
//! has no validator of its own.

use super::{ConstraintValidator, ConstraintValidatorContext, ConstraintValidators, ValidatorFailure};
use beanval_core::Value;
use beanval_descriptor::{builtin, ConstraintDescriptor};
use regex_lite::Regex;
use std::cmp::Ordering;

/// Register the built-in validators.
pub fn register(validators: &mut ConstraintValidators) {
    validators.register(builtin::NOT_NULL, || NotNullValidator);
    validators.register(builtin::NULL, || NullValidator);
    validators.register(builtin::NOT_EMPTY, || NotEmptyValidator);
    validators.register(builtin::NOT_BLANK, || NotBlankValidator);
    validators.register(builtin::SIZE, SizeValidator::default);
    validators.register(builtin::MIN, || BoundValidator::new(Ordering::Less));
    validators.register(builtin::MAX, || BoundValidator::new(Ordering::Greater));
    validators.register(builtin::PATTERN, PatternValidator::default);
    validators.register(builtin::ASSERT_TRUE, || AssertValidator(true));
    validators.register(builtin::ASSERT_FALSE, || AssertValidator(false));
}

fn int_attribute(descriptor: &ConstraintDescriptor, name: &str) -> Result<i64, ValidatorFailure> {
    descriptor
        .attribute(name)
        .and_then(|value| value.as_int())
        .ok_or_else(|| ValidatorFailure::new(format!("{} has no integer attribute '{}'", descriptor, name)))
}

#[derive(Debug, Clone, Copy)]
pub struct NotNullValidator;

impl ConstraintValidator for NotNullValidator {
    fn is_valid(&self, value: &Value, _context: &mut ConstraintValidatorContext<'_>) -> Result<bool, ValidatorFailure> {
        Ok(!value.is_null())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NullValidator;

impl ConstraintValidator for NullValidator {
    fn is_valid(&self, value: &Value, _context: &mut ConstraintValidatorContext<'_>) -> Result<bool, ValidatorFailure> {
        Ok(value.is_null())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotEmptyValidator;

impl ConstraintValidator for NotEmptyValidator {
    fn supports(&self, value: &Value) -> bool {
        value.size().is_some()
    }

    fn is_valid(&self, value: &Value, _context: &mut ConstraintValidatorContext<'_>) -> Result<bool, ValidatorFailure> {
        Ok(value.size().map(|size| size > 0).unwrap_or(false))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotBlankValidator;

impl ConstraintValidator for NotBlankValidator {
    fn supports(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn is_valid(&self, value: &Value, _context: &mut ConstraintValidatorContext<'_>) -> Result<bool, ValidatorFailure> {
        Ok(value.as_str().map(|s| !s.trim().is_empty()).unwrap_or(false))
    }
}

/// Characters of a string or elements of a container within `[min, max]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeValidator {
    min: i64,
    max: i64,
}

impl ConstraintValidator for SizeValidator {
    fn initialize(&mut self, descriptor: &ConstraintDescriptor) -> Result<(), ValidatorFailure> {
        self.min = int_attribute(descriptor, "min")?;
        self.max = int_attribute(descriptor, "max")?;
        if self.min < 0 {
            return Err(ValidatorFailure::new("the min parameter cannot be negative"));
        }
        if self.max < self.min {
            return Err(ValidatorFailure::new("the length cannot be negative"));
        }
        Ok(())
    }

    fn supports(&self, value: &Value) -> bool {
        value.size().is_some()
    }

    fn is_valid(&self, value: &Value, _context: &mut ConstraintValidatorContext<'_>) -> Result<bool, ValidatorFailure> {
        let Some(size) = value.size() else {
            return Ok(true);
        };
        let size = i64::try_from(size).unwrap_or(i64::MAX);
        Ok(size >= self.min && size <= self.max)
    }
}

/// `Min` and `Max`: the value must not compare as `rejected` against the
/// bound. Numeric strings are compared by value; other strings are invalid.
#[derive(Debug, Clone, Copy)]
pub struct BoundValidator {
    rejected: Ordering,
    bound: i64,
}

impl BoundValidator {
    fn new(rejected: Ordering) -> Self {
        Self { rejected, bound: 0 }
    }
}

impl ConstraintValidator for BoundValidator {
    fn initialize(&mut self, descriptor: &ConstraintDescriptor) -> Result<(), ValidatorFailure> {
        self.bound = int_attribute(descriptor, "value")?;
        Ok(())
    }

    fn supports(&self, value: &Value) -> bool {
        matches!(value, Value::Int(_) | Value::Float(_) | Value::String(_))
    }

    fn is_valid(&self, value: &Value, _context: &mut ConstraintValidatorContext<'_>) -> Result<bool, ValidatorFailure> {
        if value.is_null() {
            return Ok(true);
        }
        match value.compare_numeric(&Value::Int(self.bound)) {
            Some(ordering) => Ok(ordering != self.rejected),
            None => Ok(false),
        }
    }
}

/// The whole string must match the regular expression.
#[derive(Debug, Clone, Default)]
pub struct PatternValidator {
    regex: Option<Regex>,
}

impl ConstraintValidator for PatternValidator {
    fn initialize(&mut self, descriptor: &ConstraintDescriptor) -> Result<(), ValidatorFailure> {
        let regexp = descriptor
            .attribute("regexp")
            .and_then(|value| value.as_str())
            .ok_or_else(|| ValidatorFailure::new("Pattern has no regexp"))?;
        let anchored = format!("^(?:{})$", regexp);
        let regex = Regex::new(&anchored)
            .map_err(|e| ValidatorFailure::new(format!("invalid regular expression '{}': {}", regexp, e)))?;
        self.regex = Some(regex);
        Ok(())
    }

    fn supports(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn is_valid(&self, value: &Value, _context: &mut ConstraintValidatorContext<'_>) -> Result<bool, ValidatorFailure> {
        let Some(s) = value.as_str() else {
            return Ok(true);
        };
        let regex = self
            .regex
            .as_ref()
            .ok_or_else(|| ValidatorFailure::new("Pattern validator used before initialization"))?;
        Ok(regex.is_match(s))
    }
}

/// `AssertTrue` and `AssertFalse`.
#[derive(Debug, Clone, Copy)]
pub struct AssertValidator(bool);

impl ConstraintValidator for AssertValidator {
    fn supports(&self, value: &Value) -> bool {
        value.is_bool()
    }

    fn is_valid(&self, value: &Value, _context: &mut ConstraintValidatorContext<'_>) -> Result<bool, ValidatorFailure> {
        Ok(value.as_bool().map(|b| b == self.0).unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanval_core::Annotation;
    use beanval_descriptor::{ConstraintDefinitions, DescriptorBuilder, DescriptorContext, ElementKind};
    use beanval_types::TypeRegistryBuilder;
    use pretty_assertions::assert_eq;

    fn check(annotation: Annotation, values: &[Value]) -> Vec<bool> {
        let mut builder = TypeRegistryBuilder::new();
        builder.add_class("com.acme.Order").done().unwrap();
        let types = builder.build();
        let definitions = ConstraintDefinitions::with_builtins();
        let descriptor = DescriptorBuilder::new(&definitions, &types)
            .build(&annotation, &DescriptorContext::new("com.acme.Order", ElementKind::Property))
            .unwrap();
        let mut validator = ConstraintValidators::with_builtins()
            .create(descriptor.definition(), descriptor.constraint_type())
            .unwrap();
        validator.initialize(&descriptor).unwrap();

        values
            .iter()
            .map(|value| {
                let mut context = ConstraintValidatorContext::new(&descriptor);
                validator.is_valid(value, &mut context).unwrap()
            })
            .collect()
    }

    // ========== TEST: null_checks ==========
    #[test]
    fn test_null_checks() {
        assert_eq!(check(builtin::not_null(), &[Value::Null, Value::from("x")]), vec![false, true]);
        assert_eq!(check(builtin::null(), &[Value::Null, Value::from(1)]), vec![true, false]);
    }

    // ========== TEST: emptiness ==========
    #[test]
    fn test_emptiness() {
        let values = [
            Value::Null,
            Value::from(""),
            Value::from("  "),
            Value::from("a"),
            Value::List(vec![]),
            Value::List(vec![Value::from(1)]),
        ];

        assert_eq!(check(builtin::not_empty(), &values), vec![false, false, true, true, false, true]);
        assert_eq!(check(builtin::not_blank(), &values[..4]), vec![false, false, false, true]);
    }

    // ========== TEST: size_bounds ==========
    #[test]
    fn test_size_bounds() {
        // GIVEN Size(2, 3)
        let values = [
            Value::Null,
            Value::from("a"),
            Value::from("ab"),
            Value::from("abc"),
            Value::from("abcd"),
            Value::List(vec![Value::from(1), Value::from(2)]),
        ];

        // WHEN checking values of several sizes
        let results = check(builtin::size(2, 3), &values);

        // THEN only sizes within the bounds pass, null included
        assert_eq!(results, vec![true, false, true, true, false, true]);
    }

    // ========== TEST: numeric_bounds ==========
    #[test]
    fn test_numeric_bounds() {
        let values = [
            Value::Null,
            Value::from(4),
            Value::from(5),
            Value::from(5.5),
            Value::from("6"),
            Value::from("four"),
        ];

        assert_eq!(check(builtin::min(5), &values), vec![true, false, true, true, true, false]);
        assert_eq!(check(builtin::max(5), &values), vec![true, true, true, false, false, false]);
    }

    // ========== TEST: pattern_matches_whole_string ==========
    #[test]
    fn test_pattern_matches_whole_string() {
        let values = [Value::Null, Value::from("AB-12"), Value::from("xAB-12"), Value::from("AB-123")];

        assert_eq!(check(builtin::pattern("[A-Z]{2}-[0-9]{2}"), &values), vec![true, true, false, false]);
    }

    #[test]
    fn test_assertions() {
        let values = [Value::Null, Value::from(true), Value::from(false)];

        assert_eq!(check(builtin::assert_true(), &values), vec![true, true, false]);
        assert_eq!(check(builtin::assert_false(), &values), vec![true, false, true]);
    }

    #[test]
    fn test_supported_values() {
        let mut validators = ConstraintValidators::new();
        register(&mut validators);

        assert_eq!(validators.len(), 10);
        assert!(!SizeValidator::default().supports(&Value::from(true)));
        assert!(!AssertValidator(true).supports(&Value::from("true")));
        assert!(BoundValidator::new(Ordering::Less).supports(&Value::from("12")));
    }
}
