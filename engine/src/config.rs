//! Validator factory configuration.

use crate::ValidationResult;
use beanval_metadata::MethodValidationConfig;
use serde::{Deserialize, Serialize};

/// Settings applied by a `ValidatorFactory`.
///
/// Missing keys take their default when read from JSON:
///
/// ```json
/// { "fail_fast": true, "predefined_types": ["com.acme.Order"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Stop a validation call at its first violation.
    pub fail_fast: bool,
    /// Relaxations of the rules for overridden and parallel methods.
    pub method_validation: MethodValidationConfig,
    /// Types whose metadata is built when the factory is built.
    pub predefined_types: Vec<String>,
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> ValidationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ValidationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_method_validation(mut self, method_validation: MethodValidationConfig) -> Self {
        self.method_validation = method_validation;
        self
    }

    pub fn with_predefined_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.predefined_types = types.into_iter().map(Into::into).collect();
        self
    }
}
