//! Message interpolation.

use beanval_core::Value;
use beanval_descriptor::ConstraintDescriptor;

/// What a message template is interpolated against.
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub descriptor: &'a ConstraintDescriptor,
    pub validated_value: &'a Value,
}

/// Turns a message template into the message of a violation.
pub trait MessageInterpolator: Send + Sync {
    fn interpolate(&self, template: &str, context: &MessageContext<'_>) -> String;
}

/// Replaces `{attribute}` placeholders with the constraint's attribute
/// values and `{validatedValue}` with the failing value.
///
/// `\{`, `\}` and `\\` escape the literal characters. Placeholders naming
/// no attribute are left as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterMessageInterpolator;

impl ParameterMessageInterpolator {
    pub fn new() -> Self {
        Self
    }

    fn resolve(name: &str, context: &MessageContext<'_>) -> Option<String> {
        if name == "validatedValue" {
            return Some(context.validated_value.to_string());
        }
        context.descriptor.attribute(name).map(|value| value.to_string())
    }
}

impl MessageInterpolator for ParameterMessageInterpolator {
    fn interpolate(&self, template: &str, context: &MessageContext<'_>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped @ ('{' | '}' | '\\')) => out.push(escaped),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    match (closed, Self::resolve(&name, context)) {
                        (true, Some(value)) => out.push_str(&value),
                        (true, None) => {
                            out.push('{');
                            out.push_str(&name);
                            out.push('}');
                        }
                        (false, _) => {
                            out.push('{');
                            out.push_str(&name);
                        }
                    }
                }
                other => out.push(other),
            }
        }
        out
    }
}
