//! Deferred sub-assembly: handlers that receive a member's recorded
//! instructions instead of having them executed in place.

use crate::error::DeferredError;
use crate::instruction::RecordedInstructions;
use crate::member::Member;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Turns a recorded instruction sequence into the member's value.
pub trait DeferredLoader: Send + Sync {
    fn load(&self, member: &Member, instructions: RecordedInstructions)
    -> Result<Value, DeferredError>;
}

/// At most one loader per member.
#[derive(Clone, Default)]
pub struct DeferredLoaders {
    loaders: HashMap<Member, Arc<dyn DeferredLoader>>,
}

impl DeferredLoaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        member: Member,
        loader: Arc<dyn DeferredLoader>,
    ) -> Result<(), DeferredError> {
        if self.loaders.contains_key(&member) {
            return Err(DeferredError::DuplicateLoader {
                member: member.qualified_name(),
            });
        }
        self.loaders.insert(member, loader);
        Ok(())
    }

    pub fn get(&self, member: &Member) -> Option<Arc<dyn DeferredLoader>> {
        self.loaders.get(member).cloned()
    }

    pub fn contains(&self, member: &Member) -> bool {
        self.loaders.contains_key(member)
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl fmt::Debug for DeferredLoaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.loaders.keys()).finish()
    }
}
