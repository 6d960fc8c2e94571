//! Beanval Core Types
//!
//! This crate provides the foundational types used throughout the validation engine:
//! - Identity types (TypeId, TypeName, BeanIdentity)
//! - Value types (the Value enum covering scalars, containers and bean references)
//! - The Bean object model (Bean trait, BeanRef, DynamicBean)
//! - Annotations as declared on types and members
//! - Property paths (Path, Node)
//! - Common error types

mod annotation;
mod bean;
mod error;
mod id;
pub mod names;
mod path;
mod value;

pub use annotation::*;
pub use bean::*;
pub use error::*;
pub use id::*;
pub use path::*;
pub use value::*;
