//! Member metadata: the settable or attachable characteristics of a type.

use crate::types::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// How a member is committed to its target instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A member declared by the target's own type.
    Standard,
    /// A member declared by another type and stored on the target.
    Attached,
    /// An event; its literal value names a handler on the root instance.
    Event,
    /// An event declared by another type and stored on the target.
    AttachedEvent,
    /// A pipeline directive such as the implicit items of a collection.
    Directive,
}

/// The literal value type a member converts its source string into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValueType {
    #[default]
    Any,
    String,
    Integer,
    Float,
    Boolean,
    /// A type name, resolved through the metadata provider.
    Type,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Any => "any",
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Type => "type",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
struct MemberInfo {
    owner: TypeId,
    name: String,
    kind: MemberKind,
    value_type: ValueType,
    dependencies: Vec<String>,
    content: bool,
    collection: bool,
    deferred: bool,
}

/// A member of a constructible type.
///
/// Shared by reference between every node of the same type; equality and
/// hashing only consider the owning type and the name.
#[derive(Clone)]
pub struct Member(Arc<MemberInfo>);

impl Member {
    /// Name of the directive member that receives the items of a type that is
    /// itself a collection.
    pub const ITEMS: &'static str = "_Items";

    fn with_kind(owner: impl Into<TypeId>, name: impl Into<String>, kind: MemberKind) -> Self {
        Self(Arc::new(MemberInfo {
            owner: owner.into(),
            name: name.into(),
            kind,
            value_type: ValueType::Any,
            dependencies: Vec::new(),
            content: false,
            collection: false,
            deferred: false,
        }))
    }

    pub fn standard(owner: impl Into<TypeId>, name: impl Into<String>) -> Self {
        Self::with_kind(owner, name, MemberKind::Standard)
    }

    pub fn attached(owner: impl Into<TypeId>, name: impl Into<String>) -> Self {
        Self::with_kind(owner, name, MemberKind::Attached)
    }

    pub fn event(owner: impl Into<TypeId>, name: impl Into<String>) -> Self {
        Self::with_kind(owner, name, MemberKind::Event)
    }

    pub fn attached_event(owner: impl Into<TypeId>, name: impl Into<String>) -> Self {
        Self::with_kind(owner, name, MemberKind::AttachedEvent)
    }

    /// The implicit items directive of a collection type.
    pub fn items(owner: impl Into<TypeId>) -> Self {
        Self::with_kind(owner, Self::ITEMS, MemberKind::Directive)
            .as_content()
            .as_collection()
    }

    /// Declare that `member` (of the same type) must be assigned first.
    pub fn depends_on(mut self, member: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.0).dependencies.push(member.into());
        self
    }

    pub fn as_content(mut self) -> Self {
        Arc::make_mut(&mut self.0).content = true;
        self
    }

    pub fn as_collection(mut self) -> Self {
        Arc::make_mut(&mut self.0).collection = true;
        self
    }

    pub fn as_deferred(mut self) -> Self {
        Arc::make_mut(&mut self.0).deferred = true;
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        Arc::make_mut(&mut self.0).value_type = value_type;
        self
    }

    pub fn owner(&self) -> &TypeId {
        &self.0.owner
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> MemberKind {
        self.0.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.0.value_type
    }

    pub fn dependencies(&self) -> &[String] {
        &self.0.dependencies
    }

    pub fn is_content(&self) -> bool {
        self.0.content
    }

    pub fn is_collection(&self) -> bool {
        self.0.collection
    }

    pub fn is_deferred(&self) -> bool {
        self.0.deferred
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.0.kind, MemberKind::Attached | MemberKind::AttachedEvent)
    }

    pub fn is_event(&self) -> bool {
        matches!(self.0.kind, MemberKind::Event | MemberKind::AttachedEvent)
    }

    pub fn is_items(&self) -> bool {
        self.0.kind == MemberKind::Directive && self.0.name == Self::ITEMS
    }

    /// `Owner.Name`, as used in property elements and diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.0.owner, self.0.name)
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.owner == other.0.owner && self.0.name == other.0.name)
    }
}

impl Eq for Member {}

impl Hash for Member {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.owner.hash(state);
        self.0.name.hash(state);
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0.owner, self.0.name)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Member({}.{})", self.0.owner, self.0.name)
    }
}
