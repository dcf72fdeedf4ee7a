use serde_json::Value;
use trellis_core::{FieldContext, Result, Rule};

/// Ensures the value is an object.
#[derive(Debug, Default)]
pub struct ObjectRule;

impl Rule for ObjectRule {
    fn name(&self) -> &str {
        "object"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        if !field.value.is_object() {
            field.report("The {{ field }} field must be an object", "object", None);
        }
        Ok(())
    }
}

/// Ensures the value is an array.
#[derive(Debug, Default)]
pub struct ArrayRule;

impl Rule for ArrayRule {
    fn name(&self) -> &str {
        "array"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        if !field.value.is_array() {
            field.report("The {{ field }} field must be an array", "array", None);
        }
        Ok(())
    }
}

/// Restricts the value to a declared set of choices.
#[derive(Debug, Default)]
pub struct EnumRule;

impl Rule for EnumRule {
    fn name(&self) -> &str {
        "enum"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(choices) = options
            .and_then(|opts| opts.get("choices"))
            .and_then(Value::as_array)
        else {
            return Ok(());
        };
        if !choices.contains(&field.value) {
            field.report(
                "The selected {{ field }} is invalid",
                "enum",
                options.cloned(),
            );
        }
        Ok(())
    }
}

/// Checkbox-style acceptance: truthy forms normalize to `true`.
#[derive(Debug, Default)]
pub struct AcceptedRule;

impl Rule for AcceptedRule {
    fn name(&self) -> &str {
        "accepted"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let accepted = match &field.value {
            Value::Bool(true) => true,
            Value::String(raw) => matches!(raw.as_str(), "true" | "on" | "yes" | "1"),
            Value::Number(number) => number.as_i64() == Some(1),
            _ => false,
        };
        if accepted {
            field.mutate(Value::Bool(true));
        } else {
            field.report(
                "The {{ field }} field must be accepted",
                "accepted",
                None,
            );
        }
        Ok(())
    }
}

/// Requires the value to equal a single expected literal.
#[derive(Debug, Default)]
pub struct LiteralRule;

impl Rule for LiteralRule {
    fn name(&self) -> &str {
        "literal"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(expected) = options.and_then(|opts| opts.get("expected")) else {
            return Ok(());
        };
        if &field.value != expected {
            field.report(
                "The {{ field }} field must be {{ expected }}",
                "literal",
                options.cloned(),
            );
        }
        Ok(())
    }
}
