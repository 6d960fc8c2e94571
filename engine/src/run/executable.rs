//! Parameter and return value validation.

use super::{container_elements, BeanContext, ValidationRun};
use crate::ValidationResult;
use beanval_core::{Path, TypeName, Value};
use beanval_groups::ValidationOrder;
use beanval_metadata::{ExecutableMetaData, MetaConstraint};
use beanval_types::ExecutableKind;
use std::sync::Arc;

/// What an executable validation looks at.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target<'a> {
    Parameters(&'a [Value]),
    ReturnValue(&'a Value),
}

fn executable_path(executable: &ExecutableMetaData) -> Path {
    match executable.kind() {
        ExecutableKind::Method => Path::root().add_method(executable.name()),
        ExecutableKind::Constructor => Path::root().add_constructor(executable.name()),
    }
}

impl ValidationRun<'_> {
    /// Validate the arguments or the return value of an executable.
    ///
    /// Flat groups are validated first, constraints before cascades. Each
    /// sequence then runs step by step and stops after the first step that
    /// produced violations.
    pub(crate) fn validate_executable(
        &mut self,
        ctx: &BeanContext,
        executable: &ExecutableMetaData,
        target: Target<'_>,
        order: &ValidationOrder,
    ) -> ValidationResult<()> {
        for group in order.groups() {
            self.validate_executable_for_group(ctx, executable, target, group.defining_type())?;
            if self.should_fail_fast() {
                return Ok(());
            }
        }
        for group in order.groups() {
            self.cascade_executable(executable, target, group.defining_type())?;
            if self.should_fail_fast() {
                return Ok(());
            }
        }

        for sequence in order.sequences() {
            for step in sequence.steps() {
                let before = self.violations.len();
                for group in step {
                    self.validate_executable_for_group(ctx, executable, target, group.defining_type())?;
                    if self.should_fail_fast() {
                        return Ok(());
                    }
                    self.cascade_executable(executable, target, group.defining_type())?;
                    if self.should_fail_fast() {
                        return Ok(());
                    }
                }
                if self.violations.len() > before {
                    break;
                }
            }
        }
        Ok(())
    }

    fn validate_executable_for_group(
        &mut self,
        ctx: &BeanContext,
        executable: &ExecutableMetaData,
        target: Target<'_>,
        group: &TypeName,
    ) -> ValidationResult<()> {
        if !(group.is_default_group() && ctx.meta.is_default_group_sequence_redefined()) {
            self.validate_executable_constraints(ctx, executable, target, group)?;
            return Ok(());
        }

        // Default is replaced by the bean's own default sequence.
        let sequence = self.default_sequence(&ctx.meta, ctx.bean.as_ref())?;
        let order = self.state.generator.default_validation_order(ctx.meta.bean_type(), &sequence)?;
        for sequence in order.sequences() {
            for step in sequence.steps() {
                let before = self.violations.len();
                for member in step {
                    self.validate_executable_constraints(ctx, executable, target, member.defining_type())?;
                    if self.should_fail_fast() {
                        return Ok(());
                    }
                }
                if self.violations.len() > before {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn validate_executable_constraints(
        &mut self,
        ctx: &BeanContext,
        executable: &ExecutableMetaData,
        target: Target<'_>,
        group: &TypeName,
    ) -> ValidationResult<()> {
        let path = executable_path(executable);
        match target {
            Target::Parameters(arguments) => {
                if !executable.cross_parameter_constraints().is_empty() {
                    let value = Value::List(arguments.to_vec());
                    let cross_path = path.add_cross_parameter();
                    for constraint in executable.cross_parameter_constraints() {
                        self.validate_element_constraint(ctx, constraint, group, &cross_path, &path, &value)?;
                        if self.should_fail_fast() {
                            return Ok(());
                        }
                    }
                }

                for (parameter, argument) in executable.parameters().iter().zip(arguments) {
                    let parameter_path = path.add_parameter(parameter.name(), parameter.index());
                    let value = if parameter.cascading().unwrap_mode().unwraps() {
                        argument.unwrapped()
                    } else {
                        argument.clone()
                    };
                    for constraint in parameter.constraints() {
                        self.validate_element_constraint(ctx, constraint, group, &parameter_path, &parameter_path, &value)?;
                        if self.should_fail_fast() {
                            return Ok(());
                        }
                    }
                    self.validate_container_elements(ctx, parameter.element_constraints(), group, &parameter_path, argument)?;
                    if self.should_fail_fast() {
                        return Ok(());
                    }
                }
            }
            Target::ReturnValue(returned) => {
                let return_path = path.add_return_value();
                let value = if executable.return_cascading().unwrap_mode().unwraps() {
                    returned.unwrapped()
                } else {
                    returned.clone()
                };
                for constraint in executable.return_value_constraints() {
                    self.validate_element_constraint(ctx, constraint, group, &return_path, &return_path, &value)?;
                    if self.should_fail_fast() {
                        return Ok(());
                    }
                }
                self.validate_container_elements(
                    ctx,
                    executable.return_element_constraints(),
                    group,
                    &return_path,
                    returned,
                )?;
            }
        }
        Ok(())
    }

    fn validate_container_elements(
        &mut self,
        ctx: &BeanContext,
        constraints: &[Arc<MetaConstraint>],
        group: &TypeName,
        container_path: &Path,
        container: &Value,
    ) -> ValidationResult<()> {
        if constraints.is_empty() {
            return Ok(());
        }
        for (key, node, element) in container_elements(container) {
            let path = container_path.enter_element(key).add_container_element(node);
            for constraint in constraints {
                self.validate_element_constraint(ctx, constraint, group, &path, &path, &element)?;
                if self.should_fail_fast() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn validate_element_constraint(
        &mut self,
        ctx: &BeanContext,
        constraint: &Arc<MetaConstraint>,
        group: &TypeName,
        path: &Path,
        custom_base: &Path,
        value: &Value,
    ) -> ValidationResult<bool> {
        if !constraint.belongs_to(group) {
            return Ok(true);
        }
        self.validate_once(ctx, constraint, path, custom_base, value)
    }

    fn cascade_executable(
        &mut self,
        executable: &ExecutableMetaData,
        target: Target<'_>,
        group: &TypeName,
    ) -> ValidationResult<()> {
        let path = executable_path(executable);
        match target {
            Target::Parameters(arguments) => {
                for (parameter, argument) in executable.parameters().iter().zip(arguments) {
                    if !parameter.cascading().is_cascading() {
                        continue;
                    }
                    let parameter_path = path.add_parameter(parameter.name(), parameter.index());
                    self.cascade_value(argument, &parameter_path, group, parameter.cascading())?;
                    if self.should_fail_fast() {
                        return Ok(());
                    }
                }
            }
            Target::ReturnValue(returned) => {
                if executable.return_cascading().is_cascading() {
                    self.cascade_value(returned, &path.add_return_value(), group, executable.return_cascading())?;
                }
            }
        }
        Ok(())
    }
}
