//! The linter.

use crate::checks::{overrides, placement, sequences};
use crate::Diagnostics;
use beanval_descriptor::ConstraintDefinitions;
use beanval_metadata::MethodValidationConfig;
use beanval_types::TypeRegistry;
use tracing::debug;

/// Runs every check over all types of a registry.
pub struct ConstraintLinter<'a> {
    types: &'a TypeRegistry,
    definitions: &'a ConstraintDefinitions,
    config: MethodValidationConfig,
}

impl<'a> ConstraintLinter<'a> {
    pub fn new(types: &'a TypeRegistry, definitions: &'a ConstraintDefinitions) -> Self {
        Self {
            types,
            definitions,
            config: MethodValidationConfig::default(),
        }
    }

    /// Relax the method rules the same way the validator factory does.
    pub fn with_method_validation(mut self, config: MethodValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lint(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let ctx = Context {
            types: self.types,
            definitions: self.definitions,
            config: &self.config,
        };

        let mut type_defs: Vec<_> = self.types.all_types().collect();
        type_defs.sort_by(|a, b| a.name.cmp(&b.name));
        for type_def in type_defs {
            overrides::check(&ctx, type_def, &mut diagnostics);
            sequences::check(&ctx, type_def, &mut diagnostics);
            placement::check(&ctx, type_def, &mut diagnostics);
        }

        debug!(
            types = self.types.len(),
            errors = diagnostics.errors().count(),
            warnings = diagnostics.warnings().count(),
            "linted constraint declarations"
        );
        diagnostics
    }
}

/// What every check gets to look at.
pub(crate) struct Context<'a> {
    pub types: &'a TypeRegistry,
    pub definitions: &'a ConstraintDefinitions,
    pub config: &'a MethodValidationConfig,
}
