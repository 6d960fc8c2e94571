//! Beanval Lint
//!
//! Checks constraint declarations on the type model without building any
//! metadata, so that broken declarations are found before a validator
//! ever sees them.
//!
//! Responsibilities:
//! - Check overriding and parallel methods against the parameter and
//!   return value rules
//! - Check class and interface group sequences
//! - Check default group sequence providers
//! - Check where constraints, cascades and group conversions are placed

mod checks;
mod diagnostic;
mod linter;

pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use linter::ConstraintLinter;
