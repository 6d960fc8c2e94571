//! Directives to ignore annotation-declared constraints.

use crate::{BeanConfiguration, ConfigurationSource, ConstrainedElement};
use beanval_core::TypeName;
use beanval_types::Signature;
use std::collections::HashMap;

/// A member a directive applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    Property(String),
    Executable(Signature),
}

/// Which annotation-declared constraints to ignore.
///
/// A directive for a specific element takes precedence over the directive
/// for its member, which takes precedence over the bean-level directive.
/// Cascading declarations are never ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationProcessingOptions {
    beans: HashMap<TypeName, bool>,
    class_level: HashMap<TypeName, bool>,
    members: HashMap<(TypeName, Member), bool>,
    parameters: HashMap<(TypeName, Signature, usize), bool>,
    return_values: HashMap<(TypeName, Signature), bool>,
    cross_parameters: HashMap<(TypeName, Signature), bool>,
}

impl AnnotationProcessingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_annotations(&mut self, bean: impl Into<TypeName>, ignore: bool) {
        self.beans.insert(bean.into(), ignore);
    }

    pub fn ignore_class_level(&mut self, bean: impl Into<TypeName>, ignore: bool) {
        self.class_level.insert(bean.into(), ignore);
    }

    pub fn ignore_member(&mut self, bean: impl Into<TypeName>, member: Member, ignore: bool) {
        self.members.insert((bean.into(), member), ignore);
    }

    pub fn ignore_parameter(
        &mut self,
        bean: impl Into<TypeName>,
        signature: Signature,
        index: usize,
        ignore: bool,
    ) {
        self.parameters.insert((bean.into(), signature, index), ignore);
    }

    pub fn ignore_return_value(&mut self, bean: impl Into<TypeName>, signature: Signature, ignore: bool) {
        self.return_values.insert((bean.into(), signature), ignore);
    }

    pub fn ignore_cross_parameter(
        &mut self,
        bean: impl Into<TypeName>,
        signature: Signature,
        ignore: bool,
    ) {
        self.cross_parameters.insert((bean.into(), signature), ignore);
    }

    /// Add all directives of `other`; its directives win on conflicts.
    pub fn merge(&mut self, other: &AnnotationProcessingOptions) {
        self.beans.extend(other.beans.iter().map(|(k, v)| (k.clone(), *v)));
        self.class_level
            .extend(other.class_level.iter().map(|(k, v)| (k.clone(), *v)));
        self.members
            .extend(other.members.iter().map(|(k, v)| (k.clone(), *v)));
        self.parameters
            .extend(other.parameters.iter().map(|(k, v)| (k.clone(), *v)));
        self.return_values
            .extend(other.return_values.iter().map(|(k, v)| (k.clone(), *v)));
        self.cross_parameters
            .extend(other.cross_parameters.iter().map(|(k, v)| (k.clone(), *v)));
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
            && self.class_level.is_empty()
            && self.members.is_empty()
            && self.parameters.is_empty()
            && self.return_values.is_empty()
            && self.cross_parameters.is_empty()
    }

    pub fn are_all_ignored(&self, bean: &TypeName) -> bool {
        self.beans.get(bean).copied().unwrap_or(false)
    }

    pub fn are_class_level_ignored(&self, bean: &TypeName) -> bool {
        self.class_level
            .get(bean)
            .copied()
            .unwrap_or_else(|| self.are_all_ignored(bean))
    }

    pub fn are_member_ignored(&self, bean: &TypeName, member: &Member) -> bool {
        self.members
            .get(&(bean.clone(), member.clone()))
            .copied()
            .unwrap_or_else(|| self.are_all_ignored(bean))
    }

    pub fn are_parameter_ignored(&self, bean: &TypeName, signature: &Signature, index: usize) -> bool {
        self.parameters
            .get(&(bean.clone(), signature.clone(), index))
            .copied()
            .unwrap_or_else(|| self.are_member_ignored(bean, &Member::Executable(signature.clone())))
    }

    pub fn are_return_value_ignored(&self, bean: &TypeName, signature: &Signature) -> bool {
        self.return_values
            .get(&(bean.clone(), signature.clone()))
            .copied()
            .unwrap_or_else(|| self.are_member_ignored(bean, &Member::Executable(signature.clone())))
    }

    pub fn are_cross_parameter_ignored(&self, bean: &TypeName, signature: &Signature) -> bool {
        self.cross_parameters
            .get(&(bean.clone(), signature.clone()))
            .copied()
            .unwrap_or_else(|| self.are_member_ignored(bean, &Member::Executable(signature.clone())))
    }

    /// Drop ignored constraints from an annotation-sourced configuration.
    /// Other configurations are left untouched.
    pub fn apply(&self, config: &mut BeanConfiguration) {
        if config.source != ConfigurationSource::Annotation || self.is_empty() {
            return;
        }
        let bean = config.bean_type.clone();
        for element in &mut config.elements {
            match element {
                ConstrainedElement::Type(t) => {
                    if self.are_class_level_ignored(&bean) {
                        t.constraints.clear();
                    }
                }
                ConstrainedElement::Property(p) => {
                    if self.are_member_ignored(&bean, &Member::Property(p.name.clone())) {
                        p.constraints.clear();
                        p.element_constraints.clear();
                    }
                }
                ConstrainedElement::Executable(e) => {
                    let signature = e.signature.clone();
                    for parameter in &mut e.parameters {
                        if self.are_parameter_ignored(&bean, &signature, parameter.index) {
                            parameter.constraints.clear();
                            parameter.element_constraints.clear();
                        }
                    }
                    if self.are_return_value_ignored(&bean, &signature) {
                        e.return_value_constraints.clear();
                        e.return_element_constraints.clear();
                    }
                    if self.are_cross_parameter_ignored(&bean, &signature) {
                        e.cross_parameter_constraints.clear();
                    }
                }
            }
        }
    }
}
