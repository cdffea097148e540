//! Host-supplied services: type metadata, activation and literal conversion.
//!
//! The pipeline never hardcodes a type system. Everything it knows about a
//! type comes through these traits.

use crate::error::{ActivationError, ConversionError};
use crate::member::Member;
use crate::types::{TypeCapabilities, TypeId};
use crate::value::{ObjectRef, Value};

/// Type metadata: names, members and capability flags.
pub trait MetadataProvider: Send + Sync {
    /// Resolve a type name as written in markup.
    fn resolve_type(&self, name: &str) -> Option<TypeId>;

    /// Every standard, event and directive member declared by `type_id`.
    fn members_of(&self, type_id: &TypeId) -> Vec<Member>;

    fn member(&self, type_id: &TypeId, name: &str) -> Option<Member> {
        self.members_of(type_id)
            .into_iter()
            .find(|m| m.name() == name)
    }

    /// A member declared by `owner` for use on instances of other types.
    fn attached_member(&self, owner: &TypeId, name: &str) -> Option<Member>;

    /// The member that receives element content, if any.
    fn content_member_of(&self, type_id: &TypeId) -> Option<Member> {
        self.members_of(type_id).into_iter().find(Member::is_content)
    }

    fn capabilities(&self, type_id: &TypeId) -> TypeCapabilities;

    fn is_collection_target(&self, member: &Member) -> bool {
        member.is_collection()
    }

    fn is_namescope_boundary(&self, type_id: &TypeId) -> bool {
        self.capabilities(type_id).namescope
    }

    fn is_lifecycle_aware(&self, type_id: &TypeId) -> bool {
        self.capabilities(type_id).lifecycle
    }

    fn is_value_producing_extension(&self, type_id: &TypeId) -> bool {
        self.capabilities(type_id).extension
    }

    fn is_collection_type(&self, type_id: &TypeId) -> bool {
        self.capabilities(type_id).collection
    }
}

/// Creates instances from a type and literal constructor arguments.
pub trait Activator: Send + Sync {
    fn activate(&self, type_id: &TypeId, arguments: &[String]) -> Result<ObjectRef, ActivationError>;
}

/// Converts a literal string into the value a member expects.
pub trait ValueConverter: Send + Sync {
    fn convert(&self, member: &Member, literal: &str) -> Result<Value, ConversionError>;
}
