//! # Weaver Core
//!
//! Domain types, capability traits, and build services for the Weaver object
//! construction pipeline. Markup is extracted into [`ConstructionNode`]s,
//! flattened into [`Instruction`]s, and assembled into live instances.
//!
//! ## Design Philosophy
//!
//! Every host-facing seam is a trait defined here:
//! - [`MetadataProvider`], [`Activator`] and [`ValueConverter`] describe the
//!   host type system
//! - [`Instance`] and its capability traits are implemented by host objects
//! - [`DeferredLoader`] receives recorded instruction spans
//!
//! Implementations live in their respective crates.

pub mod context;
pub mod error;
pub mod instance;
pub mod instruction;
pub mod member;
pub mod node;
pub mod provider;
pub mod types;
pub mod value;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for ergonomics
pub use context::{
    AmbientRecord, AmbientRegistry, BuildContext, DeferredLoader, DeferredLoaders,
    ExtensionContext, LifecycleNotifier, NamescopeRegistry, ScopeId,
};
pub use error::{
    ActivationError, ConversionError, DeferredError, Error, ExtensionError, ExtractionError,
    MemberError, NamescopeError, Result, StructureError,
};
pub use instance::{AttachedValues, Collection, Instance, Lifecycle, ValueProvider};
pub use instruction::{Instruction, ObjectStart, RecordedInstructions};
pub use member::{Member, MemberKind, ValueType};
pub use node::{AssignmentValue, ConstructionNode, MemberAssignment};
pub use provider::{Activator, MetadataProvider, ValueConverter};
pub use types::{TypeCapabilities, TypeId};
pub use value::{EventHandler, ObjectRef, Value, WeakObjectRef};
