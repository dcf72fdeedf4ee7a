use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};
use trellis_core::{FieldContext, Result, Rule};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/$.?#].[^\s]*$").expect("url pattern compiles")
});

/// Ensures the value is a string.
#[derive(Debug, Default)]
pub struct StringRule;

impl Rule for StringRule {
    fn name(&self) -> &str {
        "string"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        if !field.value.is_string() {
            field.report("The {{ field }} field must be a string", "string", None);
        }
        Ok(())
    }
}

/// Enforces a minimum character count.
#[derive(Debug, Default)]
pub struct MinLengthRule;

impl Rule for MinLengthRule {
    fn name(&self) -> &str {
        "min_length"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        let min = options
            .and_then(|opts| opts.get("min"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if (value.chars().count() as u64) < min {
            field.report(
                "The {{ field }} field must have at least {{ min }} characters",
                "min_length",
                options.cloned(),
            );
        }
        Ok(())
    }
}

/// Enforces a maximum character count.
#[derive(Debug, Default)]
pub struct MaxLengthRule;

impl Rule for MaxLengthRule {
    fn name(&self) -> &str {
        "max_length"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        let max = options
            .and_then(|opts| opts.get("max"))
            .and_then(Value::as_u64)
            .unwrap_or(u64::MAX);
        if (value.chars().count() as u64) > max {
            field.report(
                "The {{ field }} field must not be greater than {{ max }} characters",
                "max_length",
                options.cloned(),
            );
        }
        Ok(())
    }
}

/// Enforces an exact character count.
#[derive(Debug, Default)]
pub struct FixedLengthRule;

impl Rule for FixedLengthRule {
    fn name(&self) -> &str {
        "fixed_length"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        let Some(length) = options
            .and_then(|opts| opts.get("length"))
            .and_then(Value::as_u64)
        else {
            return Ok(());
        };
        if value.chars().count() as u64 != length {
            field.report(
                "The {{ field }} field must be {{ length }} characters long",
                "fixed_length",
                options.cloned(),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EmailRule;

impl Rule for EmailRule {
    fn name(&self) -> &str {
        "email"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        if !EMAIL_PATTERN.is_match(value) {
            field.report(
                "The {{ field }} field must be a valid email address",
                "email",
                None,
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct UrlRule;

impl Rule for UrlRule {
    fn name(&self) -> &str {
        "url"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        if !URL_PATTERN.is_match(value) {
            field.report("The {{ field }} field must be a valid URL", "url", None);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct UuidRule;

impl Rule for UuidRule {
    fn name(&self) -> &str {
        "uuid"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        if uuid::Uuid::parse_str(value).is_err() {
            field.report("The {{ field }} field must be a valid UUID", "uuid", None);
        }
        Ok(())
    }
}

/// Matches the value against a caller-supplied pattern.
#[derive(Debug)]
pub struct RegexRule {
    pattern: Regex,
}

impl RegexRule {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Rule for RegexRule {
    fn name(&self) -> &str {
        "regex"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        if !self.pattern.is_match(value) {
            field.report(
                "The {{ field }} field format is invalid",
                "regex",
                Some(json!({ "pattern": self.pattern.as_str() })),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StartsWithRule;

impl Rule for StartsWithRule {
    fn name(&self) -> &str {
        "starts_with"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        let Some(prefix) = options
            .and_then(|opts| opts.get("prefix"))
            .and_then(Value::as_str)
        else {
            return Ok(());
        };
        if !value.starts_with(prefix) {
            field.report(
                "The {{ field }} field must start with {{ prefix }}",
                "starts_with",
                options.cloned(),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EndsWithRule;

impl Rule for EndsWithRule {
    fn name(&self) -> &str {
        "ends_with"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str() else {
            return Ok(());
        };
        let Some(suffix) = options
            .and_then(|opts| opts.get("suffix"))
            .and_then(Value::as_str)
        else {
            return Ok(());
        };
        if !value.ends_with(suffix) {
            field.report(
                "The {{ field }} field must end with {{ suffix }}",
                "ends_with",
                options.cloned(),
            );
        }
        Ok(())
    }
}

/// Compares the value against a sibling confirmation field.
///
/// The sibling key defaults to `<name>_confirmation`.
#[derive(Debug, Default)]
pub struct ConfirmedRule;

impl Rule for ConfirmedRule {
    fn name(&self) -> &str {
        "confirmed"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        if !field.value.is_string() {
            return Ok(());
        }
        let sibling_key = options
            .and_then(|opts| opts.get("confirmation_field"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_confirmation", field.position.name));

        let confirmed = field.sibling(&sibling_key) == Some(&field.value);
        if !confirmed {
            field.report(
                "The {{ field }} field and {{ confirmation_field }} field must be the same",
                "confirmed",
                Some(json!({ "confirmation_field": sibling_key })),
            );
        }
        Ok(())
    }
}

/// Trims surrounding whitespace. Never reports.
#[derive(Debug, Default)]
pub struct TrimRule;

impl Rule for TrimRule {
    fn name(&self) -> &str {
        "trim"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        if let Some(value) = field.value.as_str() {
            let trimmed = value.trim();
            if trimmed != value {
                field.mutate(Value::String(trimmed.to_string()));
            }
        }
        Ok(())
    }
}

/// Lowercases the value. Never reports.
#[derive(Debug, Default)]
pub struct LowercaseRule;

impl Rule for LowercaseRule {
    fn name(&self) -> &str {
        "to_lowercase"
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> Result<()> {
        if let Some(value) = field.value.as_str() {
            if value.chars().any(char::is_uppercase) {
                field.mutate(Value::String(value.to_lowercase()));
            }
        }
        Ok(())
    }
}
