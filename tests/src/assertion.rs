//! Assertion types and builders for verifying step results.

use beanval_engine::Violations;

use crate::error::{TestError, TestResult};

/// What a step's result must look like. Unset fields are not checked.
#[derive(Default)]
pub struct Assertion {
    pub count: Option<usize>,
    /// Exact sorted paths of all violations.
    pub paths: Option<Vec<String>>,
    /// Paths that must carry at least one violation.
    pub at: Vec<String>,
    /// Paths that must not carry a violation.
    pub not_at: Vec<String>,
    /// (path, message) pairs that must be reported.
    pub messages: Vec<(String, String)>,

    pub error: Option<String>,

    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&Violations) -> bool>>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("count", &self.count)
            .field("paths", &self.paths)
            .field("at", &self.at)
            .field("not_at", &self.not_at)
            .field("messages", &self.messages)
            .field("error", &self.error)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Assertion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// No violations at all.
    pub fn valid(self) -> Self {
        self.count(0)
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        paths.sort();
        self.paths = Some(paths);
        self
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.at.push(path.into());
        self
    }

    pub fn not_at(mut self, path: impl Into<String>) -> Self {
        self.not_at.push(path.into());
        self
    }

    pub fn message(mut self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.push((path.into(), message.into()));
        self
    }

    /// The step must fail with an error whose text contains `fragment`.
    pub fn error(mut self, fragment: impl Into<String>) -> Self {
        self.error = Some(fragment.into());
        self
    }

    pub fn custom(mut self, check: impl Fn(&Violations) -> bool + 'static) -> Self {
        self.custom = Some(Box::new(check));
        self
    }

    /// Verify the assertion against a step result.
    pub fn verify(&self, step: &str, result: &Result<Violations, String>) -> TestResult<()> {
        if let Some(ref expected) = self.error {
            return match result {
                Err(msg) if msg.contains(expected) => Ok(()),
                Err(msg) => Err(TestError::assertion_failed(
                    step,
                    format!("expected error containing '{}', got: {}", expected, msg),
                )),
                Ok(violations) => Err(TestError::assertion_failed(
                    step,
                    format!(
                        "expected error containing '{}', but step returned {} violations",
                        expected,
                        violations.len()
                    ),
                )),
            };
        }

        let violations = result
            .as_ref()
            .map_err(|msg| TestError::assertion_failed(step, format!("step failed: {}", msg)))?;

        if let Some(expected) = self.count {
            if violations.len() != expected {
                return Err(TestError::assertion_failed(
                    step,
                    format!(
                        "expected {} violations, got {}: {:?}",
                        expected,
                        violations.len(),
                        violations.paths()
                    ),
                ));
            }
        }

        if let Some(ref expected) = self.paths {
            let actual = violations.paths();
            if &actual != expected {
                return Err(TestError::assertion_failed(
                    step,
                    format!("path mismatch:\n  expected: {:?}\n  actual:   {:?}", expected, actual),
                ));
            }
        }

        for path in &self.at {
            if violations.at(path).next().is_none() {
                return Err(TestError::assertion_failed(
                    step,
                    format!("expected a violation at '{}', got: {:?}", path, violations.paths()),
                ));
            }
        }

        for path in &self.not_at {
            if violations.at(path).next().is_some() {
                return Err(TestError::assertion_failed(
                    step,
                    format!("expected no violation at '{}'", path),
                ));
            }
        }

        for (path, message) in &self.messages {
            if !violations.at(path).any(|v| &v.message == message) {
                let actual: Vec<&str> = violations.at(path).map(|v| v.message.as_str()).collect();
                return Err(TestError::assertion_failed(
                    step,
                    format!("expected message '{}' at '{}', got: {:?}", message, path, actual),
                ));
            }
        }

        if let Some(ref custom) = self.custom {
            if !custom(violations) {
                return Err(TestError::assertion_failed(step, "custom assertion failed"));
            }
        }

        Ok(())
    }
}
