//! The context handed to constraint validators.

use beanval_descriptor::ConstraintDescriptor;

/// A violation added by a validator in place of, or in addition to, the
/// default one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomViolation {
    pub message_template: String,
    /// Property nodes appended to the path of the validated element.
    pub property_nodes: Vec<String>,
}

/// Lets a validator replace the default violation of its constraint.
#[derive(Debug)]
pub struct ConstraintValidatorContext<'a> {
    descriptor: &'a ConstraintDescriptor,
    default_disabled: bool,
    custom: Vec<CustomViolation>,
}

impl<'a> ConstraintValidatorContext<'a> {
    pub(crate) fn new(descriptor: &'a ConstraintDescriptor) -> Self {
        Self {
            descriptor,
            default_disabled: false,
            custom: Vec::new(),
        }
    }

    /// The constraint being validated.
    pub fn descriptor(&self) -> &ConstraintDescriptor {
        self.descriptor
    }

    pub fn default_message_template(&self) -> &str {
        self.descriptor.message_template()
    }

    /// Do not report the default violation when the value is invalid.
    pub fn disable_default_violation(&mut self) {
        self.default_disabled = true;
    }

    /// Start a custom violation with the given message template.
    pub fn build_violation(&mut self, message_template: impl Into<String>) -> ViolationBuilder<'_, 'a> {
        ViolationBuilder {
            context: self,
            violation: CustomViolation {
                message_template: message_template.into(),
                property_nodes: Vec::new(),
            },
        }
    }

    pub(crate) fn is_default_disabled(&self) -> bool {
        self.default_disabled
    }

    pub(crate) fn into_custom(self) -> Vec<CustomViolation> {
        self.custom
    }
}

/// A custom violation under construction.
pub struct ViolationBuilder<'c, 'a> {
    context: &'c mut ConstraintValidatorContext<'a>,
    violation: CustomViolation,
}

impl<'c, 'a> ViolationBuilder<'c, 'a> {
    pub fn add_property_node(mut self, name: impl Into<String>) -> Self {
        self.violation.property_nodes.push(name.into());
        self
    }

    /// Add the violation to the context.
    pub fn add(self) {
        self.context.custom.push(self.violation);
    }
}
