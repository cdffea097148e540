//! Build-scoped services shared by every object constructed in one build.
//!
//! A [`BuildContext`] owns the namescope registry, the ambient registry and
//! the lifecycle notifier. It is created by the caller, threaded through one
//! top-level build, and never shared between builds running concurrently.

pub mod ambient;
pub mod deferred;
pub mod lifecycle;
pub mod namescope;

pub use ambient::{AmbientRecord, AmbientRegistry};
pub use deferred::{DeferredLoader, DeferredLoaders};
pub use lifecycle::LifecycleNotifier;
pub use namescope::{NamescopeRegistry, ScopeId};

use crate::member::Member;
use crate::value::{ObjectRef, Value};

#[derive(Debug, Default)]
pub struct BuildContext {
    namescopes: NamescopeRegistry,
    ambient: AmbientRegistry,
    lifecycle: LifecycleNotifier,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namescopes(&self) -> &NamescopeRegistry {
        &self.namescopes
    }

    pub fn namescopes_mut(&mut self) -> &mut NamescopeRegistry {
        &mut self.namescopes
    }

    pub fn ambient(&self) -> &AmbientRegistry {
        &self.ambient
    }

    pub fn ambient_mut(&mut self) -> &mut AmbientRegistry {
        &mut self.ambient
    }

    pub fn lifecycle(&self) -> &LifecycleNotifier {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut LifecycleNotifier {
        &mut self.lifecycle
    }
}

/// What a value-producing extension can see while it provides its value.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionContext<'a> {
    build: &'a BuildContext,
    target_object: Option<&'a ObjectRef>,
    target_member: Option<&'a Member>,
    scope: Option<ScopeId>,
    root: Option<&'a ObjectRef>,
}

impl<'a> ExtensionContext<'a> {
    pub fn new(build: &'a BuildContext) -> Self {
        Self {
            build,
            target_object: None,
            target_member: None,
            scope: None,
            root: None,
        }
    }

    /// The object and member that will receive the provided value.
    pub fn with_target(mut self, object: Option<&'a ObjectRef>, member: Option<&'a Member>) -> Self {
        self.target_object = object;
        self.target_member = member;
        self
    }

    pub fn with_scope(mut self, scope: Option<ScopeId>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_root(mut self, root: Option<&'a ObjectRef>) -> Self {
        self.root = root;
        self
    }

    pub fn build(&self) -> &'a BuildContext {
        self.build
    }

    pub fn target_object(&self) -> Option<&'a ObjectRef> {
        self.target_object
    }

    pub fn target_member(&self) -> Option<&'a Member> {
        self.target_member
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    pub fn root(&self) -> Option<&'a ObjectRef> {
        self.root
    }

    /// Resolve a name in the namescope the extension was constructed in.
    pub fn find_name(&self, name: &str) -> Option<ObjectRef> {
        self.build.namescopes().find_in(self.scope?, name)
    }

    /// The most recently resolved value of a member called `member_name`.
    pub fn ambient_value(&self, member_name: &str) -> Option<&'a Value> {
        self.build.ambient().lookup(member_name)
    }
}
