//! Errors reported by the scenario runner.

use thiserror::Error;

/// Result type for scenario runs.
pub type TestResult<T> = Result<T, TestError>;

#[derive(Debug, Error)]
pub enum TestError {
    #[error("scenario '{scenario}': factory could not be built: {message}")]
    FactoryBuild { scenario: String, message: String },

    #[error("step '{step}': {message}")]
    AssertionFailed { step: String, message: String },
}

impl TestError {
    pub fn factory_build(scenario: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FactoryBuild {
            scenario: scenario.into(),
            message: message.into(),
        }
    }

    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }
}
