//! Minimal instances for unit tests inside this crate.

use crate::error::MemberError;
use crate::instance::{Instance, Lifecycle};
use crate::member::Member;
use crate::types::TypeId;
use crate::value::Value;

#[derive(Debug, Default)]
pub(crate) struct Plain {
    pub(crate) begun: u32,
    pub(crate) ended: u32,
}

impl Instance for Plain {
    fn instance_type(&self) -> TypeId {
        TypeId::new("Plain")
    }

    fn set_member(&mut self, _member: &Member, _value: Value) -> Result<(), MemberError> {
        Ok(())
    }

    fn as_lifecycle_mut(&mut self) -> Option<&mut dyn Lifecycle> {
        Some(self)
    }
}

impl Lifecycle for Plain {
    fn on_begin_init(&mut self) {
        self.begun += 1;
    }

    fn on_end_init(&mut self) {
        self.ended += 1;
    }
}
