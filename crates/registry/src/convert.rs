//! Literal conversion by declared member value type.

use weaver_core::{ConversionError, Member, TypeId, Value, ValueConverter, ValueType};

/// Converts literals to strings, integers, floats, booleans and type names.
///
/// Members typed `Any` keep the literal as a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConverter;

impl StandardConverter {
    pub fn new() -> Self {
        Self
    }
}

fn failure(member: &Member, literal: &str, reason: impl ToString) -> ConversionError {
    ConversionError {
        member: member.qualified_name(),
        value: literal.to_string(),
        target: member.value_type().to_string(),
        reason: reason.to_string(),
    }
}

impl ValueConverter for StandardConverter {
    fn convert(&self, member: &Member, literal: &str) -> Result<Value, ConversionError> {
        match member.value_type() {
            ValueType::Any | ValueType::String => Ok(Value::Str(literal.to_string())),
            ValueType::Integer => literal
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| failure(member, literal, e)),
            ValueType::Float => literal
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| failure(member, literal, e)),
            ValueType::Boolean => match literal.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(failure(member, literal, "expected 'true' or 'false'")),
            },
            ValueType::Type => {
                let name = literal.trim();
                if name.is_empty() {
                    return Err(failure(member, literal, "empty type name"));
                }
                Ok(Value::Type(TypeId::new(name)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(value_type: ValueType) -> Member {
        Member::standard("Window", "Prop").with_value_type(value_type)
    }

    #[test]
    fn converts_by_value_type() {
        let conv = StandardConverter::new();
        assert_eq!(conv.convert(&member(ValueType::Integer), " 12 ").unwrap(), Value::Int(12));
        assert_eq!(conv.convert(&member(ValueType::Float), "1.5").unwrap(), Value::Float(1.5));
        assert_eq!(conv.convert(&member(ValueType::Boolean), "True").unwrap(), Value::Bool(true));
        assert_eq!(conv.convert(&member(ValueType::Any), "x").unwrap(), Value::from("x"));
        assert_eq!(
            conv.convert(&member(ValueType::Type), "TextBlock").unwrap(),
            Value::Type(TypeId::new("TextBlock"))
        );
    }

    #[test]
    fn failure_names_member_and_target() {
        let err = StandardConverter
            .convert(&member(ValueType::Integer), "tall")
            .unwrap_err();
        assert_eq!(err.member, "Window.Prop");
        assert_eq!(err.target, "integer");
        assert_eq!(err.value, "tall");
    }
}
