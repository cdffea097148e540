//! Type identity and capability flags.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifies a constructible type by name.
///
/// Cheap to clone; equality and hashing are by name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(Arc<str>);

impl TypeId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

impl Borrow<str> for TypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&TypeId> for TypeId {
    fn from(id: &TypeId) -> Self {
        id.clone()
    }
}

/// The orthogonal capabilities a type may declare.
///
/// The executor only ever asks "does this type have capability X"; there is
/// no base-type hierarchy behind these flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCapabilities {
    /// Instances are collections that accept appended items.
    pub collection: bool,
    /// Instances own a namescope for their descendants.
    pub namescope: bool,
    /// Instances want begin/end initialization notifications.
    pub lifecycle: bool,
    /// Instances produce a value that replaces them in their parent member.
    pub extension: bool,
}

impl TypeCapabilities {
    pub fn none() -> Self {
        Self::default()
    }
}
