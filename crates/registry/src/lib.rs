//! Table-driven host type system for Weaver.
//!
//! [`TypeRegistry`] implements the three host seams the pipeline consumes:
//! - [`MetadataProvider`](weaver_core::MetadataProvider) from registered
//!   [`TypeDescriptor`]s
//! - [`Activator`](weaver_core::Activator) from constructors keyed by arity
//! - [`ValueConverter`](weaver_core::ValueConverter) through
//!   [`StandardConverter`], with type names checked against the registry

pub mod convert;
pub mod registry;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use convert::StandardConverter;
pub use registry::{Constructor, TypeDescriptor, TypeRegistry};
