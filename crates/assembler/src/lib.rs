//! # Weaver Assembler
//!
//! Turns construction nodes into live object graphs:
//! - [`sort`] orders each node's member assignments by declared dependencies
//! - [`InstructionWriter`] flattens a node tree into the instruction stream
//! - [`ObjectAssembler`] executes the stream against a frame stack
//! - [`ObjectBuilder`] and [`MarkupLoader`] are the entry points

pub mod builder;
pub mod executor;
mod frame;
pub mod loader;
pub mod sort;
pub mod stream;
pub mod template;

pub use builder::ObjectBuilder;
pub use executor::{AssemblerServices, ObjectAssembler};
pub use loader::MarkupLoader;
pub use sort::{dependency_order, sort_assignments};
pub use stream::InstructionWriter;
pub use template::{TemplateContent, TemplateLoader};
