//! The type registry: descriptors for every constructible type.

use crate::convert::StandardConverter;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use weaver_core::{
    ActivationError, Activator, ConversionError, Instance, Member, MetadataProvider, ObjectRef,
    TypeCapabilities, TypeId, Value, ValueConverter, ValueType,
};

/// Builds an instance from literal constructor arguments.
pub type Constructor = Arc<dyn Fn(&[String]) -> Result<ObjectRef, ActivationError> + Send + Sync>;

/// Everything the pipeline needs to know about one type.
#[derive(Clone)]
pub struct TypeDescriptor {
    type_id: TypeId,
    capabilities: TypeCapabilities,
    members: Vec<Member>,
    attached: Vec<Member>,
    constructors: HashMap<usize, Constructor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<TypeId>) -> Self {
        Self {
            type_id: name.into(),
            capabilities: TypeCapabilities::none(),
            members: Vec::new(),
            attached: Vec::new(),
            constructors: HashMap::new(),
        }
    }

    pub fn collection(mut self) -> Self {
        self.capabilities.collection = true;
        self
    }

    pub fn namescope(mut self) -> Self {
        self.capabilities.namescope = true;
        self
    }

    pub fn lifecycle(mut self) -> Self {
        self.capabilities.lifecycle = true;
        self
    }

    pub fn extension(mut self) -> Self {
        self.capabilities.extension = true;
        self
    }

    /// Declare a standard, event or directive member.
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Declare a member this type attaches to instances of other types.
    pub fn attached(mut self, name: &str, value_type: ValueType) -> Self {
        let member = Member::attached(self.type_id.clone(), name).with_value_type(value_type);
        self.attached.push(member);
        self
    }

    /// Declare an event this type attaches to instances of other types.
    pub fn attached_event(mut self, name: &str) -> Self {
        self.attached
            .push(Member::attached_event(self.type_id.clone(), name));
        self
    }

    /// Register the constructor used for `arity` literal arguments.
    pub fn constructor<F>(mut self, arity: usize, factory: F) -> Self
    where
        F: Fn(&[String]) -> Result<ObjectRef, ActivationError> + Send + Sync + 'static,
    {
        self.constructors.insert(arity, Arc::new(factory));
        self
    }

    /// Register a parameterless constructor for a `Default` instance type.
    pub fn activatable<T: Instance + Default>(self) -> Self {
        self.constructor(0, |_| Ok(ObjectRef::new(T::default())))
    }

    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    pub fn capabilities(&self) -> TypeCapabilities {
        self.capabilities
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn arities(&self) -> Vec<usize> {
        let mut arities: Vec<usize> = self.constructors.keys().copied().collect();
        arities.sort_unstable();
        arities
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_id", &self.type_id)
            .field("capabilities", &self.capabilities)
            .field("members", &self.members)
            .field("attached", &self.attached)
            .field("arities", &self.arities())
            .finish()
    }
}

/// A registry of constructible types.
///
/// Serves as metadata provider, activator and literal converter for the
/// pipeline. Read-only once built, so one registry can back concurrent
/// builds.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: IndexMap<TypeId, TypeDescriptor>,
    converter: StandardConverter,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
            converter: StandardConverter::new(),
        }
    }

    /// Register a type. Replaces any existing descriptor with the same name.
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        debug!(
            type_name = %descriptor.type_id,
            members = descriptor.members.len(),
            "type registered"
        );
        self.types.insert(descriptor.type_id.clone(), descriptor);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, type_id: &TypeId) -> Option<&TypeDescriptor> {
        self.types.get(type_id)
    }

    /// List all registered type names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(TypeId::name).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for TypeRegistry {
    fn resolve_type(&self, name: &str) -> Option<TypeId> {
        self.types.get_key_value(name).map(|(id, _)| id.clone())
    }

    fn members_of(&self, type_id: &TypeId) -> Vec<Member> {
        self.get(type_id)
            .map(|d| d.members.clone())
            .unwrap_or_default()
    }

    fn member(&self, type_id: &TypeId, name: &str) -> Option<Member> {
        self.get(type_id)?
            .members
            .iter()
            .find(|m| m.name() == name)
            .cloned()
    }

    fn attached_member(&self, owner: &TypeId, name: &str) -> Option<Member> {
        self.get(owner)?
            .attached
            .iter()
            .find(|m| m.name() == name)
            .cloned()
    }

    fn content_member_of(&self, type_id: &TypeId) -> Option<Member> {
        self.get(type_id)?
            .members
            .iter()
            .find(|m| m.is_content())
            .cloned()
    }

    fn capabilities(&self, type_id: &TypeId) -> TypeCapabilities {
        self.get(type_id)
            .map(TypeDescriptor::capabilities)
            .unwrap_or_default()
    }
}

impl Activator for TypeRegistry {
    fn activate(&self, type_id: &TypeId, arguments: &[String]) -> Result<ObjectRef, ActivationError> {
        let descriptor = self.get(type_id).ok_or_else(|| ActivationError::NotActivatable {
            type_name: type_id.to_string(),
        })?;
        if descriptor.constructors.is_empty() {
            return Err(ActivationError::NotActivatable {
                type_name: type_id.to_string(),
            });
        }
        let constructor = descriptor.constructors.get(&arguments.len()).ok_or_else(|| {
            ActivationError::NoMatchingConstructor {
                type_name: type_id.to_string(),
                arity: arguments.len(),
            }
        })?;
        constructor(arguments)
    }
}

impl ValueConverter for TypeRegistry {
    fn convert(&self, member: &Member, literal: &str) -> Result<Value, ConversionError> {
        let value = self.converter.convert(member, literal)?;
        if let Value::Type(type_id) = &value {
            if self.resolve_type(type_id.name()).is_none() {
                return Err(ConversionError {
                    member: member.qualified_name(),
                    value: literal.to_string(),
                    target: ValueType::Type.to_string(),
                    reason: format!("unknown type '{type_id}'"),
                });
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, MyImmutable, TextBlock};

    #[test]
    fn register_and_resolve() {
        let registry = fixtures::registry();
        assert!(registry.resolve_type("Window").is_some());
        assert!(registry.resolve_type("Nope").is_none());
        assert!(registry.names().contains(&"TextBlock"));
    }

    #[test]
    fn members_and_content_member() {
        let registry = fixtures::registry();
        let window = TypeId::new("Window");
        let content = registry.content_member_of(&window).unwrap();
        assert_eq!(content.name(), "Content");
        assert!(registry.member(&window, "Title").is_some());
        assert!(registry.member(&window, "Missing").is_none());

        let items = registry.content_member_of(&TypeId::new("ItemsControl")).unwrap();
        assert!(registry.is_collection_target(&items));
    }

    #[test]
    fn capabilities_come_from_descriptors() {
        let registry = fixtures::registry();
        assert!(registry.is_namescope_boundary(&TypeId::new("Window")));
        assert!(!registry.is_namescope_boundary(&TypeId::new("TextBlock")));
        assert!(registry.is_value_producing_extension(&TypeId::new("SimpleExtension")));
        assert!(registry.is_collection_type(&TypeId::new("Collection")));
        assert_eq!(
            registry.capabilities(&TypeId::new("Unknown")),
            TypeCapabilities::none()
        );
    }

    #[test]
    fn attached_members_resolve_on_their_owner() {
        let registry = fixtures::registry();
        let row = registry.attached_member(&TypeId::new("Grid"), "Row").unwrap();
        assert!(row.is_attached());
        assert!(registry.attached_member(&TypeId::new("Window"), "Row").is_none());

        let loaded = registry.attached_member(&TypeId::new("Window"), "Loaded").unwrap();
        assert!(loaded.is_attached());
        assert!(loaded.is_event());
    }

    #[test]
    fn activation_by_arity() {
        let registry = fixtures::registry();
        let block = registry.activate(&TypeId::new("TextBlock"), &[]).unwrap();
        assert!(block.is::<TextBlock>());

        let immutable = registry
            .activate(&TypeId::new("MyImmutable"), &["Hola".to_string()])
            .unwrap();
        assert_eq!(immutable.with(|m: &MyImmutable| m.text.clone()), Some("Hola".into()));

        let err = registry.activate(&TypeId::new("MyImmutable"), &[]).unwrap_err();
        assert!(matches!(err, ActivationError::NoMatchingConstructor { arity: 0, .. }));

        let err = registry.activate(&TypeId::new("Unknown"), &[]).unwrap_err();
        assert!(matches!(err, ActivationError::NotActivatable { .. }));
    }

    #[test]
    fn type_literals_must_be_registered() {
        let registry = fixtures::registry();
        let member = Member::standard("Setter", "Target").with_value_type(ValueType::Type);
        assert_eq!(
            registry.convert(&member, "TextBlock").unwrap(),
            Value::Type(TypeId::new("TextBlock"))
        );
        assert!(registry.convert(&member, "Nope").is_err());
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::new("A"));
        registry.register(TypeDescriptor::new("A").namescope());
        assert_eq!(registry.len(), 1);
        assert!(registry.is_namescope_boundary(&TypeId::new("A")));
    }
}
