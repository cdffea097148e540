//! Ambient registry: every resolved member assignment, in construction order.

use crate::member::Member;
use crate::value::{ObjectRef, Value};

/// One resolved assignment: `owner.member = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientRecord {
    pub member: Member,
    pub value: Value,
    pub owner: ObjectRef,
}

/// Append-only for the duration of a build.
#[derive(Debug, Default)]
pub struct AmbientRegistry {
    records: Vec<AmbientRecord>,
}

impl AmbientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, member: &Member, value: Value, owner: &ObjectRef) {
        self.records.push(AmbientRecord {
            member: member.clone(),
            value,
            owner: owner.clone(),
        });
    }

    /// All records, in append order.
    pub fn assignments(&self) -> &[AmbientRecord] {
        &self.records
    }

    /// Distinct owners of the records, in order of first appearance.
    pub fn instances(&self) -> Vec<ObjectRef> {
        let mut seen: Vec<ObjectRef> = Vec::new();
        for record in &self.records {
            if !seen.iter().any(|o| o.ptr_eq(&record.owner)) {
                seen.push(record.owner.clone());
            }
        }
        seen
    }

    /// The most recently resolved value of any member called `name`.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.records
            .iter()
            .rev()
            .find(|r| r.member.name() == name)
            .map(|r| &r.value)
    }

    /// The most recently resolved value of exactly `member`.
    pub fn lookup_member(&self, member: &Member) -> Option<&Value> {
        self.records
            .iter()
            .rev()
            .find(|r| &r.member == member)
            .map(|r| &r.value)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
