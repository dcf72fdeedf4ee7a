use std::collections::HashSet;

use serde_json::Value;
use trellis_core::{FieldContext, Result, Rule};

/// Enforces a minimum element count.
#[derive(Debug, Default)]
pub struct ArrayMinLengthRule;

impl Rule for ArrayMinLengthRule {
    fn name(&self) -> &str {
        "min_length"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(items) = field.value.as_array() else {
            return Ok(());
        };
        let min = options
            .and_then(|opts| opts.get("min"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if (items.len() as u64) < min {
            field.report(
                "The {{ field }} field must have at least {{ min }} items",
                "min_length",
                options.cloned(),
            );
        }
        Ok(())
    }
}

/// Enforces a maximum element count.
#[derive(Debug, Default)]
pub struct ArrayMaxLengthRule;

impl Rule for ArrayMaxLengthRule {
    fn name(&self) -> &str {
        "max_length"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(items) = field.value.as_array() else {
            return Ok(());
        };
        let max = options
            .and_then(|opts| opts.get("max"))
            .and_then(Value::as_u64)
            .unwrap_or(u64::MAX);
        if (items.len() as u64) > max {
            field.report(
                "The {{ field }} field must not have more than {{ max }} items",
                "max_length",
                options.cloned(),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NotEmptyRule;

impl Rule for NotEmptyRule {
    fn name(&self) -> &str {
        "not_empty"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(items) = field.value.as_array() else {
            return Ok(());
        };
        if items.is_empty() {
            field.report(
                "The {{ field }} field must not be empty",
                "not_empty",
                None,
            );
        }
        Ok(())
    }
}

/// Rejects arrays containing duplicate elements.
#[derive(Debug, Default)]
pub struct DistinctRule;

impl Rule for DistinctRule {
    fn name(&self) -> &str {
        "distinct"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(items) = field.value.as_array() else {
            return Ok(());
        };
        let mut seen = HashSet::new();
        for item in items {
            if !seen.insert(item.to_string()) {
                field.report(
                    "The {{ field }} field has duplicate values",
                    "distinct",
                    None,
                );
                break;
            }
        }
        Ok(())
    }
}
