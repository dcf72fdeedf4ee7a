use serde_json::Value;
use trellis_core::{FieldContext, Result, Rule};

/// Ensures the value is a boolean.
///
/// Unless `strict` is set in the options, the string and numeric forms
/// `"true"`, `"false"`, `"1"`, `"0"`, `1` and `0` coerce by mutation.
#[derive(Debug, Default)]
pub struct BooleanRule;

impl Rule for BooleanRule {
    fn name(&self) -> &str {
        "boolean"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let strict = options
            .and_then(|opts| opts.get("strict"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        match &field.value {
            Value::Bool(_) => return Ok(()),
            Value::String(raw) if !strict => match raw.as_str() {
                "true" | "1" => {
                    field.mutate(Value::Bool(true));
                    return Ok(());
                }
                "false" | "0" => {
                    field.mutate(Value::Bool(false));
                    return Ok(());
                }
                _ => {}
            },
            Value::Number(number) if !strict => match number.as_i64() {
                Some(1) => {
                    field.mutate(Value::Bool(true));
                    return Ok(());
                }
                Some(0) => {
                    field.mutate(Value::Bool(false));
                    return Ok(());
                }
                _ => {}
            },
            _ => {}
        }

        field.report("The {{ field }} field must be a boolean", "boolean", None);
        Ok(())
    }
}
