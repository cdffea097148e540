//! Flattening construction nodes into the instruction stream.

use crate::sort::sort_assignments;
use weaver_core::{AssignmentValue, ConstructionNode, Instruction, ObjectStart, Result};

/// Writes the instruction stream for a node tree, sorting each node's
/// assignments by member dependencies on the way.
#[derive(Debug, Default)]
pub struct InstructionWriter {
    instructions: Vec<Instruction>,
}

impl InstructionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full instruction stream for `node`.
    pub fn write(node: &ConstructionNode) -> Result<Vec<Instruction>> {
        let mut writer = Self::new();
        writer.write_node(node)?;
        Ok(writer.into_instructions())
    }

    pub fn write_node(&mut self, node: &ConstructionNode) -> Result<()> {
        self.instructions.push(Instruction::StartObject(ObjectStart {
            type_id: node.type_id.clone(),
            name: node.name.clone(),
            arguments: node.arguments.clone(),
        }));

        for assignment in sort_assignments(&node.type_id, &node.assignments)? {
            self.instructions
                .push(Instruction::start_member(&assignment.member));
            match &assignment.value {
                AssignmentValue::Literal(literal) => {
                    self.instructions.push(Instruction::value(literal.clone()));
                }
                AssignmentValue::Children(children) => {
                    for child in children {
                        self.write_node(child)?;
                    }
                }
            }
            self.instructions.push(Instruction::EndMember);
        }

        self.instructions.push(Instruction::EndObject);
        Ok(())
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_core::Member;

    fn render(instructions: &[Instruction]) -> String {
        instructions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn nested_nodes_flatten_in_order() {
        let node = ConstructionNode::new("Window")
            .named("Main")
            .assign(Member::standard("Window", "Title"), "Hi")
            .assign_children(
                Member::standard("Window", "Content"),
                vec![ConstructionNode::new("TextBlock")],
            );

        let instructions = InstructionWriter::write(&node).unwrap();
        assert_eq!(
            render(&instructions),
            "SO(Window #Main) SM(Window.Title) V(\"Hi\") EM SM(Window.Content) SO(TextBlock) EO EM EO"
        );
    }

    #[test]
    fn assignments_are_sorted_per_node() {
        let node = ConstructionNode::new("Setter")
            .assign(Member::standard("Setter", "Value").depends_on("Property"), "Value")
            .assign(Member::standard("Setter", "Property"), "NameOfSomeType");

        let instructions = InstructionWriter::write(&node).unwrap();
        assert_eq!(instructions[1], Instruction::start_member(&Member::standard("Setter", "Property")));
        assert_eq!(instructions[4], Instruction::start_member(&Member::standard("Setter", "Value")));
    }

    #[test]
    fn empty_children_write_an_empty_member() {
        let node = ConstructionNode::new("ItemsControl")
            .assign_children(Member::standard("ItemsControl", "Items").as_collection(), Vec::new());
        let instructions = InstructionWriter::write(&node).unwrap();
        assert_eq!(render(&instructions), "SO(ItemsControl) SM(ItemsControl.Items) EM EO");
    }

    #[test]
    fn arguments_travel_with_start_object() {
        let node = ConstructionNode::new("MyImmutable").with_arguments(["Hola"]);
        let instructions = InstructionWriter::write(&node).unwrap();
        match &instructions[0] {
            Instruction::StartObject(start) => assert_eq!(start.arguments, ["Hola"]),
            other => panic!("unexpected instruction: {other}"),
        }
    }
}
