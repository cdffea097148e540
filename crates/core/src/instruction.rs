//! The in-process instruction stream consumed by the assembler.

use crate::member::Member;
use crate::types::TypeId;
use std::fmt;
use std::sync::Arc;

/// Payload of a start-object instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectStart {
    pub type_id: TypeId,
    pub name: Option<String>,
    pub arguments: Vec<String>,
}

impl ObjectStart {
    pub fn new(type_id: impl Into<TypeId>) -> Self {
        Self {
            type_id: type_id.into(),
            name: None,
            arguments: Vec::new(),
        }
    }
}

/// One step of object construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    StartObject(ObjectStart),
    /// Open a placeholder frame on the current value of the parent member.
    GetObject,
    StartMember(Member),
    Value(String),
    EndMember,
    EndObject,
}

impl Instruction {
    pub fn start_object(type_id: impl Into<TypeId>) -> Self {
        Instruction::StartObject(ObjectStart::new(type_id))
    }

    pub fn start_member(member: &Member) -> Self {
        Instruction::StartMember(member.clone())
    }

    pub fn value(literal: impl Into<String>) -> Self {
        Instruction::Value(literal.into())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::StartObject(start) => match &start.name {
                Some(name) => write!(f, "SO({} #{})", start.type_id, name),
                None => write!(f, "SO({})", start.type_id),
            },
            Instruction::GetObject => f.write_str("GO"),
            Instruction::StartMember(member) => write!(f, "SM({member})"),
            Instruction::Value(literal) => write!(f, "V({literal:?})"),
            Instruction::EndMember => f.write_str("EM"),
            Instruction::EndObject => f.write_str("EO"),
        }
    }
}

/// An immutable, shareable recording of instructions, as captured for a
/// deferred member.
#[derive(Clone, PartialEq)]
pub struct RecordedInstructions(Arc<[Instruction]>);

impl RecordedInstructions {
    pub fn as_slice(&self) -> &[Instruction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.0.iter()
    }
}

impl From<Vec<Instruction>> for RecordedInstructions {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self(Arc::from(instructions))
    }
}

impl fmt::Debug for RecordedInstructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|i| i.to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_compact() {
        let title = Member::standard("Window", "Title");
        let stream = [
            Instruction::start_object("Window"),
            Instruction::start_member(&title),
            Instruction::value("Hi"),
            Instruction::EndMember,
            Instruction::EndObject,
        ];
        let text: Vec<String> = stream.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            ["SO(Window)", "SM(Window.Title)", "V(\"Hi\")", "EM", "EO"]
        );
    }

    #[test]
    fn recordings_share_storage() {
        let recording = RecordedInstructions::from(vec![Instruction::EndObject]);
        let copy = recording.clone();
        assert_eq!(recording, copy);
        assert_eq!(copy.len(), 1);
    }
}
