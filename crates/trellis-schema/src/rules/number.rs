use serde_json::Value;
use trellis_core::{FieldContext, Result, Rule};

/// Ensures the value is a number, coercing numeric strings by mutation.
#[derive(Debug, Default)]
pub struct NumberRule;

impl Rule for NumberRule {
    fn name(&self) -> &str {
        "number"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        match &field.value {
            Value::Number(_) => {}
            Value::String(raw) => match parse_number(raw) {
                Some(value) => field.mutate(value),
                None => {
                    field.report("The {{ field }} field must be a number", "number", None);
                }
            },
            _ => {
                field.report("The {{ field }} field must be a number", "number", None);
            }
        }
        Ok(())
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::from(int));
    }
    let float = raw.parse::<f64>().ok()?;
    if !float.is_finite() {
        return None;
    }
    serde_json::Number::from_f64(float).map(Value::Number)
}

#[derive(Debug, Default)]
pub struct MinRule;

impl Rule for MinRule {
    fn name(&self) -> &str {
        "min"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_f64() else {
            return Ok(());
        };
        let Some(min) = options
            .and_then(|opts| opts.get("min"))
            .and_then(Value::as_f64)
        else {
            return Ok(());
        };
        if value < min {
            field.report(
                "The {{ field }} field must be at least {{ min }}",
                "min",
                options.cloned(),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MaxRule;

impl Rule for MaxRule {
    fn name(&self) -> &str {
        "max"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_f64() else {
            return Ok(());
        };
        let Some(max) = options
            .and_then(|opts| opts.get("max"))
            .and_then(Value::as_f64)
        else {
            return Ok(());
        };
        if value > max {
            field.report(
                "The {{ field }} field must not be greater than {{ max }}",
                "max",
                options.cloned(),
            );
        }
        Ok(())
    }
}

/// Inclusive range check over both bounds.
#[derive(Debug, Default)]
pub struct RangeRule;

impl Rule for RangeRule {
    fn name(&self) -> &str {
        "range"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_f64() else {
            return Ok(());
        };
        let min = options
            .and_then(|opts| opts.get("min"))
            .and_then(Value::as_f64)
            .unwrap_or(f64::MIN);
        let max = options
            .and_then(|opts| opts.get("max"))
            .and_then(Value::as_f64)
            .unwrap_or(f64::MAX);
        if value < min || value > max {
            field.report(
                "The {{ field }} field must be between {{ min }} and {{ max }}",
                "range",
                options.cloned(),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PositiveRule;

impl Rule for PositiveRule {
    fn name(&self) -> &str {
        "positive"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_f64() else {
            return Ok(());
        };
        if value < 0.0 {
            field.report(
                "The {{ field }} field must be a positive value",
                "positive",
                None,
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NegativeRule;

impl Rule for NegativeRule {
    fn name(&self) -> &str {
        "negative"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_f64() else {
            return Ok(());
        };
        if value >= 0.0 {
            field.report(
                "The {{ field }} field must be a negative value",
                "negative",
                None,
            );
        }
        Ok(())
    }
}

/// Rejects fractional values.
#[derive(Debug, Default)]
pub struct IntegerRule;

impl Rule for IntegerRule {
    fn name(&self) -> &str {
        "integer"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_f64() else {
            return Ok(());
        };
        if value.fract() != 0.0 {
            field.report(
                "The {{ field }} field must be an integer",
                "integer",
                None,
            );
        }
        Ok(())
    }
}

/// Bounds the number of decimal places.
#[derive(Debug, Default)]
pub struct DecimalRule;

impl Rule for DecimalRule {
    fn name(&self) -> &str {
        "decimal"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        if !field.value.is_number() {
            return Ok(());
        }
        let places = field
            .value
            .to_string()
            .split_once('.')
            .map(|(_, fraction)| fraction.len() as u64)
            .unwrap_or(0);
        let min = options
            .and_then(|opts| opts.get("min_places"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let max = options
            .and_then(|opts| opts.get("max_places"))
            .and_then(Value::as_u64)
            .unwrap_or(u64::MAX);
        if places < min || places > max {
            field.report(
                "The {{ field }} field must have {{ min_places }} to {{ max_places }} decimal places",
                "decimal",
                options.cloned(),
            );
        }
        Ok(())
    }
}
