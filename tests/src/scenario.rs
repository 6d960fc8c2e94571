//! Scenario runner.

use std::sync::Arc;

use beanval_engine::{ValidationResult, Validator, ValidatorFactory, ValidatorFactoryBuilder, Violations};
use beanval_types::TypeRegistry;

use crate::assertion::Assertion;
use crate::error::{TestError, TestResult};

type Action = Box<dyn Fn(&Validator) -> ValidationResult<Violations>>;
type Configure = Box<dyn Fn(ValidatorFactoryBuilder) -> ValidatorFactoryBuilder>;

struct Step {
    name: String,
    action: Action,
    assertion: Assertion,
}

/// A named sequence of validation steps run against one factory.
pub struct Scenario {
    name: String,
    types: Arc<TypeRegistry>,
    configure: Option<Configure>,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, types: impl Into<Arc<TypeRegistry>>) -> Self {
        Self {
            name: name.into(),
            types: types.into(),
            configure: None,
            steps: Vec::new(),
        }
    }

    /// Adjust the factory before it is built: validators, mappings,
    /// configuration.
    pub fn configure(
        mut self,
        configure: impl Fn(ValidatorFactoryBuilder) -> ValidatorFactoryBuilder + 'static,
    ) -> Self {
        self.configure = Some(Box::new(configure));
        self
    }

    /// Add a step. Its action runs against a validator of the scenario's
    /// factory and its result is checked by the assertion.
    pub fn step<A, F>(mut self, name: impl Into<String>, action: A, assert: F) -> Self
    where
        A: Fn(&Validator) -> ValidationResult<Violations> + 'static,
        F: FnOnce(Assertion) -> Assertion,
    {
        self.steps.push(Step {
            name: name.into(),
            action: Box::new(action),
            assertion: assert(Assertion::new()),
        });
        self
    }

    /// Build the factory and run every step in order, stopping at the first
    /// failed assertion.
    pub fn run(&self) -> TestResult<()> {
        crate::init_tracing();

        let mut builder = ValidatorFactory::builder(Arc::clone(&self.types));
        if let Some(ref configure) = self.configure {
            builder = configure(builder);
        }
        let factory = builder
            .build()
            .map_err(|e| TestError::factory_build(&self.name, e.to_string()))?;
        let validator = factory.validator();

        for step in &self.steps {
            let result = (step.action)(&validator).map_err(|e| e.to_string());
            step.assertion.verify(&step.name, &result)?;
        }
        Ok(())
    }
}
