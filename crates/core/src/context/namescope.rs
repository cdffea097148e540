//! Namescope registry: name -> instance tables scoped to boundary objects.
//!
//! Scopes form a tree for diagnostics only. Lookups never ascend: a name is
//! visible exactly in the scope it was registered in.

use crate::error::NamescopeError;
use crate::value::ObjectRef;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Handle to one namescope inside a [`NamescopeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct Scope {
    owner: Option<ObjectRef>,
    parent: Option<ScopeId>,
    names: IndexMap<String, ObjectRef>,
}

#[derive(Debug, Default)]
pub struct NamescopeRegistry {
    scopes: Vec<Scope>,
    /// Boundary instance -> the scope it owns.
    owned: HashMap<usize, ScopeId>,
    /// Every other instance -> the scope it was constructed in.
    members: HashMap<usize, (ObjectRef, ScopeId)>,
    document: Option<ScopeId>,
}

impl NamescopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new, empty scope. An owner makes it the scope seen from that
    /// instance.
    pub fn create_scope(&mut self, owner: Option<&ObjectRef>, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        if let Some(owner) = owner {
            self.owned.insert(owner.key(), id);
        }
        self.scopes.push(Scope {
            owner: owner.cloned(),
            parent,
            names: IndexMap::new(),
        });
        debug!(scope = %id, parent = ?parent.map(|p| p.0), "namescope created");
        id
    }

    /// The unowned scope used by documents whose root is not a boundary.
    pub fn document_scope(&mut self) -> ScopeId {
        match self.document {
            Some(id) => id,
            None => {
                let id = self.create_scope(None, None);
                self.document = Some(id);
                id
            }
        }
    }

    /// Record that `instance` was constructed inside `scope`.
    pub fn enter(&mut self, instance: &ObjectRef, scope: ScopeId) {
        if self.owned.contains_key(&instance.key()) {
            return;
        }
        self.members.insert(instance.key(), (instance.clone(), scope));
    }

    /// Register `name` in `scope`. Fails if the scope already knows the name.
    pub fn register(
        &mut self,
        scope: ScopeId,
        name: &str,
        instance: &ObjectRef,
    ) -> Result<(), NamescopeError> {
        let entry = self
            .scopes
            .get_mut(scope.0)
            .ok_or(NamescopeError::UnknownScope(scope.0))?;
        if entry.names.contains_key(name) {
            return Err(NamescopeError::DuplicateName {
                name: name.to_string(),
            });
        }
        entry.names.insert(name.to_string(), instance.clone());
        debug!(scope = %scope, name, "name registered");
        Ok(())
    }

    /// Look `name` up in the scope enclosing `within` (or owned by it).
    pub fn find(&self, name: &str, within: &ObjectRef) -> Option<ObjectRef> {
        let scope = self.scope_of(within)?;
        self.find_in(scope, name)
    }

    pub fn find_in(&self, scope: ScopeId, name: &str) -> Option<ObjectRef> {
        self.scopes.get(scope.0)?.names.get(name).cloned()
    }

    /// The scope seen from `instance`: the one it owns, else the one it was
    /// constructed in.
    pub fn scope_of(&self, instance: &ObjectRef) -> Option<ScopeId> {
        self.owned
            .get(&instance.key())
            .copied()
            .or_else(|| self.members.get(&instance.key()).map(|(_, scope)| *scope))
    }

    pub fn owner_of(&self, scope: ScopeId) -> Option<&ObjectRef> {
        self.scopes.get(scope.0)?.owner.as_ref()
    }

    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope.0)?.parent
    }

    /// Names registered in `scope`, in registration order.
    pub fn names(&self, scope: ScopeId) -> Vec<&str> {
        self.scopes
            .get(scope.0)
            .map(|s| s.names.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Plain;

    #[test]
    fn duplicate_names_rejected_per_scope() {
        let mut registry = NamescopeRegistry::new();
        let scope = registry.document_scope();
        let a = ObjectRef::new(Plain::default());
        let b = ObjectRef::new(Plain::default());

        registry.register(scope, "One", &a).unwrap();
        let err = registry.register(scope, "One", &b).unwrap_err();
        assert!(matches!(err, NamescopeError::DuplicateName { name } if name == "One"));

        let other = registry.create_scope(None, Some(scope));
        assert!(registry.register(other, "One", &b).is_ok());
    }

    #[test]
    fn lookups_do_not_ascend() {
        let mut registry = NamescopeRegistry::new();
        let root = ObjectRef::new(Plain::default());
        let inner_owner = ObjectRef::new(Plain::default());
        let inner_child = ObjectRef::new(Plain::default());

        let outer = registry.create_scope(Some(&root), None);
        let inner = registry.create_scope(Some(&inner_owner), Some(outer));
        registry.enter(&inner_child, inner);

        registry.register(outer, "Outer", &root).unwrap();
        registry.register(inner, "Inner", &inner_child).unwrap();

        assert!(registry.find("Inner", &inner_child).unwrap().ptr_eq(&inner_child));
        assert!(registry.find("Inner", &inner_owner).is_some());
        assert!(registry.find("Inner", &root).is_none());
        assert!(registry.find("Outer", &inner_child).is_none());
        assert_eq!(registry.parent_of(inner), Some(outer));
        assert!(registry.owner_of(inner).unwrap().ptr_eq(&inner_owner));
    }

    #[test]
    fn document_scope_is_created_once() {
        let mut registry = NamescopeRegistry::new();
        let a = registry.document_scope();
        let b = registry.document_scope();
        assert_eq!(a, b);
        assert_eq!(registry.scope_count(), 1);
    }

    #[test]
    fn unknown_instance_has_no_scope() {
        let registry = NamescopeRegistry::new();
        let stray = ObjectRef::new(Plain::default());
        assert!(registry.find("x", &stray).is_none());
    }
}
