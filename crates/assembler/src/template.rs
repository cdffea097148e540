//! Templates: deferred members captured as replayable instruction streams.

use crate::builder::ObjectBuilder;
use weaver_core::{
    BuildContext, DeferredError, DeferredLoader, Instance, Instruction, Member, MemberError,
    ObjectRef, RecordedInstructions, Result, TypeId, Value,
};

/// The value a [`TemplateLoader`] produces: the recorded content of the
/// deferred member, ready to be materialized on demand.
#[derive(Debug, Clone)]
pub struct TemplateContent {
    instructions: RecordedInstructions,
}

impl TemplateContent {
    pub const TYPE_NAME: &'static str = "TemplateContent";

    pub fn new(instructions: RecordedInstructions) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &RecordedInstructions {
        &self.instructions
    }

    /// Build a fresh copy of the content.
    pub fn load(&self, builder: &ObjectBuilder, ctx: &mut BuildContext) -> Result<ObjectRef> {
        builder.materialize(&self.instructions, ctx)
    }
}

impl Instance for TemplateContent {
    fn instance_type(&self) -> TypeId {
        TypeId::new(Self::TYPE_NAME)
    }

    fn set_member(&mut self, member: &Member, _value: Value) -> std::result::Result<(), MemberError> {
        Err(MemberError::SetFailed {
            member: member.qualified_name(),
            reason: "template content is read-only".into(),
        })
    }
}

/// Whether `instructions` open one object and close it at the very end.
fn is_single_object(instructions: &[Instruction]) -> bool {
    let Some(Instruction::StartObject(_)) = instructions.first() else {
        return false;
    };
    let mut depth = 0usize;
    for (index, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::StartObject(_) | Instruction::GetObject => depth += 1,
            Instruction::EndObject => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return index + 1 == instructions.len();
                }
            }
            _ => {}
        }
    }
    false
}

/// Deferred loader that wraps the recorded instructions in a
/// [`TemplateContent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateLoader;

impl DeferredLoader for TemplateLoader {
    fn load(
        &self,
        member: &Member,
        instructions: RecordedInstructions,
    ) -> std::result::Result<Value, DeferredError> {
        if !is_single_object(instructions.as_slice()) {
            return Err(DeferredError::LoadFailed {
                member: member.qualified_name(),
                reason: "template content must be a single object".into(),
            });
        }
        Ok(Value::Object(ObjectRef::new(TemplateContent::new(instructions))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_wraps_recorded_instructions() {
        let member = Member::standard("DataTemplate", "Content").as_deferred();
        let recorded = RecordedInstructions::from(vec![
            Instruction::start_object("TextBlock"),
            Instruction::EndObject,
        ]);

        let value = TemplateLoader.load(&member, recorded.clone()).unwrap();
        let content = value.as_object().unwrap();
        assert!(content.is::<TemplateContent>());
        assert_eq!(
            content.with(|t: &TemplateContent| t.instructions().clone()),
            Some(recorded)
        );
    }

    #[test]
    fn literal_template_content_is_rejected() {
        let member = Member::standard("DataTemplate", "Content").as_deferred();
        let err = TemplateLoader
            .load(&member, RecordedInstructions::from(vec![Instruction::value("text")]))
            .unwrap_err();
        assert!(matches!(err, DeferredError::LoadFailed { .. }));
    }

    #[test]
    fn several_root_objects_are_rejected() {
        let member = Member::standard("DataTemplate", "Content").as_deferred();
        let two_roots = RecordedInstructions::from(vec![
            Instruction::start_object("TextBlock"),
            Instruction::EndObject,
            Instruction::start_object("TextBlock"),
            Instruction::EndObject,
        ]);
        let err = TemplateLoader.load(&member, two_roots).unwrap_err();
        assert!(matches!(err, DeferredError::LoadFailed { .. }));

        let unterminated = RecordedInstructions::from(vec![Instruction::start_object("TextBlock")]);
        assert!(TemplateLoader.load(&member, unterminated).is_err());
    }

    #[test]
    fn nested_objects_form_one_template() {
        let member = Member::standard("DataTemplate", "Content").as_deferred();
        let text = Member::standard("Window", "Content").as_content();
        let nested = RecordedInstructions::from(vec![
            Instruction::start_object("Window"),
            Instruction::start_member(&text),
            Instruction::start_object("TextBlock"),
            Instruction::EndObject,
            Instruction::EndMember,
            Instruction::EndObject,
        ]);
        assert!(TemplateLoader.load(&member, nested).is_ok());
    }
}
