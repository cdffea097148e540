//! The instance trait and the orthogonal capabilities an instance may expose.
//!
//! Capabilities are queried, never assumed: the metadata provider says whether
//! a type is a collection, an extension, or lifecycle-aware, and the instance
//! hands out the matching trait object through an `as_*` accessor.

use crate::context::ExtensionContext;
use crate::error::{ExtensionError, MemberError};
use crate::member::Member;
use crate::types::TypeId;
use crate::value::{ObjectRef, Value};
use std::any::Any;
use std::fmt;

/// Upcasting support for downcasting instances back to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An object under construction (or built) by the pipeline.
pub trait Instance: AsAny + fmt::Debug {
    /// The runtime type of this instance.
    fn instance_type(&self) -> TypeId;

    /// Setter capability for standard members.
    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError>;

    /// Getter capability, used to reach read-only collections.
    fn get_member(&self, _member: &Member) -> Option<Value> {
        None
    }

    /// Store a member declared by another type on this instance.
    fn set_attached(&mut self, member: &Member, _value: Value) -> Result<(), MemberError> {
        Err(MemberError::NotAttachable {
            member: member.qualified_name(),
            target: self.instance_type().to_string(),
        })
    }

    fn as_collection_mut(&mut self) -> Option<&mut dyn Collection> {
        None
    }

    fn as_lifecycle_mut(&mut self) -> Option<&mut dyn Lifecycle> {
        None
    }

    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        None
    }

    /// Whether this instance exposes an event handler with this name.
    fn handles(&self, _handler: &str) -> bool {
        false
    }

    /// Run the named handler. Returns `false` when the handler is unknown.
    fn invoke_handler(&mut self, _handler: &str, _sender: &ObjectRef) -> bool {
        false
    }
}

/// Append capability of collection-like instances.
pub trait Collection {
    fn append(&mut self, item: Value) -> Result<(), MemberError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Construction lifecycle notifications.
pub trait Lifecycle {
    /// Called right after activation, before any member is set.
    fn on_begin_init(&mut self) {}

    /// Called exactly once when the object closes.
    fn on_end_init(&mut self);
}

/// Value-production capability of markup extensions.
pub trait ValueProvider {
    fn provide_value(&self, context: &ExtensionContext<'_>) -> Result<Value, ExtensionError>;
}

/// Storage for attached members, for instances that accept them.
#[derive(Debug, Clone, Default)]
pub struct AttachedValues {
    entries: Vec<(Member, Value)>,
}

impl AttachedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the value of an attached member.
    pub fn set(&mut self, member: &Member, value: Value) {
        match self.entries.iter_mut().find(|(m, _)| m == member) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((member.clone(), value)),
        }
    }

    pub fn get(&self, member: &Member) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(m, _)| m == member)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attached_values_replace_in_place() {
        let row = Member::attached("Grid", "Row");
        let mut values = AttachedValues::new();
        values.set(&row, Value::Int(1));
        values.set(&row, Value::Int(2));
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(&row), Some(&Value::Int(2)));
        assert!(values.get(&Member::attached("Grid", "Column")).is_none());
    }
}
