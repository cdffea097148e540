//! Lifecycle notifier: begin/end initialization signals.

use crate::value::ObjectRef;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default)]
pub struct LifecycleNotifier {
    begun: usize,
    created: HashMap<usize, ObjectRef>,
}

impl LifecycleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that `instance` was activated. Returns whether it listened.
    pub fn notify_begin_init(&mut self, instance: &ObjectRef) -> bool {
        let mut guard = instance.borrow_mut();
        match guard.as_lifecycle_mut() {
            Some(lifecycle) => {
                lifecycle.on_begin_init();
                self.begun += 1;
                true
            }
            None => false,
        }
    }

    /// Signal that `instance` finished construction. Each instance is
    /// notified at most once; returns whether this call delivered it.
    pub fn notify_created(&mut self, instance: &ObjectRef) -> bool {
        if self.created.contains_key(&instance.key()) {
            return false;
        }
        let mut guard = instance.borrow_mut();
        let Some(lifecycle) = guard.as_lifecycle_mut() else {
            return false;
        };
        lifecycle.on_end_init();
        drop(guard);
        trace!(instance = %instance.instance_type(), "end-init delivered");
        self.created.insert(instance.key(), instance.clone());
        true
    }

    pub fn begun_count(&self) -> usize {
        self.begun
    }

    pub fn created_count(&self) -> usize {
        self.created.len()
    }
}
