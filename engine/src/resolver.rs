//! Traversable resolvers.
//!
//! A resolver decides whether the engine may read a property (reachable)
//! and whether it may cascade into its value (cascadable).

use crate::{ValidationError, ValidationResult};
use beanval_core::{BeanIdentity, BeanRef, Node, Path, TypeName};
use std::collections::HashMap;
use thiserror::Error;

/// A resolver could not answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ResolverFailure(pub String);

/// The kind of element a traversal question is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Property,
    Parameter,
    ReturnValue,
}

/// One traversal question.
#[derive(Debug, Clone, Copy)]
pub struct Traversal<'a> {
    /// The bean hosting the element, absent when validating a bare value.
    pub bean: Option<&'a BeanRef>,
    /// The node of the element.
    pub node: &'a Node,
    pub root_type: &'a TypeName,
    /// Path from the root to the hosting bean.
    pub path_to_bean: &'a Path,
    pub element_type: ElementType,
}

pub trait TraversableResolver: Send + Sync {
    fn is_reachable(&self, traversal: &Traversal<'_>) -> Result<bool, ResolverFailure>;

    fn is_cascadable(&self, traversal: &Traversal<'_>) -> Result<bool, ResolverFailure>;
}

/// Everything is reachable and cascadable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraverseAll;

impl TraversableResolver for TraverseAll {
    fn is_reachable(&self, _traversal: &Traversal<'_>) -> Result<bool, ResolverFailure> {
        Ok(true)
    }

    fn is_cascadable(&self, _traversal: &Traversal<'_>) -> Result<bool, ResolverFailure> {
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TraversalKey {
    bean: Option<BeanIdentity>,
    node: Node,
    path_to_bean: Path,
    element_type: ElementType,
}

#[derive(Debug, Clone, Copy, Default)]
struct Answers {
    reachable: Option<bool>,
    cascadable: Option<bool>,
}

/// Remembers the answers of a resolver for one validation call.
///
/// Keys contain bean identities, which are only meaningful while the
/// validated graph is borrowed by the call; never keep one across calls.
pub(crate) struct CachingResolver<'r> {
    delegate: &'r dyn TraversableResolver,
    answers: HashMap<TraversalKey, Answers>,
}

impl<'r> CachingResolver<'r> {
    pub(crate) fn new(delegate: &'r dyn TraversableResolver) -> Self {
        Self {
            delegate,
            answers: HashMap::new(),
        }
    }

    pub(crate) fn is_reachable(&mut self, traversal: &Traversal<'_>) -> ValidationResult<bool> {
        let key = Self::key(traversal);
        if let Some(reachable) = self.answers.get(&key).and_then(|a| a.reachable) {
            return Ok(reachable);
        }
        let reachable = self
            .delegate
            .is_reachable(traversal)
            .map_err(|e| Self::failure(traversal, e))?;
        self.answers.entry(key).or_default().reachable = Some(reachable);
        Ok(reachable)
    }

    /// Reachable and cascadable. Cascadability is only asked when reachable.
    pub(crate) fn is_cascade_required(&mut self, traversal: &Traversal<'_>) -> ValidationResult<bool> {
        if !self.is_reachable(traversal)? {
            return Ok(false);
        }
        let key = Self::key(traversal);
        if let Some(cascadable) = self.answers.get(&key).and_then(|a| a.cascadable) {
            return Ok(cascadable);
        }
        let cascadable = self
            .delegate
            .is_cascadable(traversal)
            .map_err(|e| Self::failure(traversal, e))?;
        self.answers.entry(key).or_default().cascadable = Some(cascadable);
        Ok(cascadable)
    }

    fn key(traversal: &Traversal<'_>) -> TraversalKey {
        TraversalKey {
            bean: traversal.bean.map(BeanRef::identity),
            node: traversal.node.clone(),
            path_to_bean: traversal.path_to_bean.clone(),
            element_type: traversal.element_type,
        }
    }

    fn failure(traversal: &Traversal<'_>, e: ResolverFailure) -> ValidationError {
        ValidationError::TraversableResolverFailed {
            path: traversal.path_to_bean.add_property(traversal.node.name()).to_string(),
            reason: e.0,
        }
    }
}
