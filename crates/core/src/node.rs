//! Construction nodes: the extracted, immutable description of what to build.

use crate::member::Member;
use crate::types::TypeId;

/// "Build an object of this type with these member assignments."
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionNode {
    pub type_id: TypeId,
    pub assignments: Vec<MemberAssignment>,
    /// Literal constructor arguments, in order.
    pub arguments: Vec<String>,
    /// Registered in the nearest namescope once the object closes.
    pub name: Option<String>,
}

impl ConstructionNode {
    pub fn new(type_id: impl Into<TypeId>) -> Self {
        Self {
            type_id: type_id.into(),
            assignments: Vec::new(),
            arguments: Vec::new(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_assignment(mut self, assignment: MemberAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    /// Append a literal assignment.
    pub fn assign(self, member: Member, literal: impl Into<String>) -> Self {
        self.with_assignment(MemberAssignment::literal(member, literal))
    }

    /// Append an assignment whose value is built from child nodes.
    pub fn assign_children(self, member: Member, children: Vec<ConstructionNode>) -> Self {
        self.with_assignment(MemberAssignment::children(member, children))
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .assignments
            .iter()
            .map(|a| a.child_nodes().iter().map(ConstructionNode::node_count).sum::<usize>())
            .sum::<usize>()
    }
}

/// The source of a member's value.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentValue {
    /// A literal string, converted by the literal converter.
    Literal(String),
    /// Zero or more nested nodes. Empty means "empty collection".
    Children(Vec<ConstructionNode>),
}

/// "Member M of the enclosing node receives value V."
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAssignment {
    pub member: Member,
    pub value: AssignmentValue,
}

impl MemberAssignment {
    pub fn literal(member: Member, literal: impl Into<String>) -> Self {
        Self {
            member,
            value: AssignmentValue::Literal(literal.into()),
        }
    }

    pub fn children(member: Member, children: Vec<ConstructionNode>) -> Self {
        Self {
            member,
            value: AssignmentValue::Children(children),
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match &self.value {
            AssignmentValue::Literal(s) => Some(s),
            AssignmentValue::Children(_) => None,
        }
    }

    /// Child nodes of this assignment; empty for literals.
    pub fn child_nodes(&self) -> &[ConstructionNode] {
        match &self.value {
            AssignmentValue::Literal(_) => &[],
            AssignmentValue::Children(children) => children,
        }
    }
}
