//! Raw markup model and assignment extraction.
//!
//! A reader (out of scope here) produces a [`RawElement`] tree; the
//! [`AssignmentExtractor`] turns it into [`ConstructionNode`]s by classifying
//! children into property elements and content, enforcing content
//! contiguity, and resolving member labels through the metadata provider.
//!
//! [`ConstructionNode`]: weaver_core::ConstructionNode

pub mod extract;
pub mod raw;

pub use extract::AssignmentExtractor;
pub use raw::{RawAttribute, RawElement, RawNode, RawPropertyElement};
