use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use trellis_core::{FieldContext, Result, Rule};

const DEFAULT_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Ensures the value is a date string in one of the accepted formats.
///
/// On success the value is normalized by mutation to ISO form, so later
/// rules and the output see a canonical representation.
#[derive(Debug, Default)]
pub struct DateRule;

impl Rule for DateRule {
    fn name(&self) -> &str {
        "date"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(raw) = field.value.as_str() else {
            field.report(
                "The {{ field }} field must be a datetime value",
                "date",
                None,
            );
            return Ok(());
        };

        let formats: Vec<&str> = options
            .and_then(|opts| opts.get("formats"))
            .and_then(Value::as_array)
            .map(|formats| formats.iter().filter_map(Value::as_str).collect())
            .unwrap_or_else(|| DEFAULT_FORMATS.to_vec());

        for format in formats {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
                field.mutate(Value::String(datetime.format(DATETIME_FORMAT).to_string()));
                return Ok(());
            }
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                field.mutate(Value::String(date.format(DATE_FORMAT).to_string()));
                return Ok(());
            }
        }

        field.report(
            "The {{ field }} field must be a datetime value",
            "date",
            None,
        );
        Ok(())
    }
}

/// Parse a value the [`DateRule`] has already normalized.
fn parse_normalized(raw: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
        return Some(datetime.date());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Requires the date to fall strictly after a limit date.
#[derive(Debug, Default)]
pub struct AfterRule;

impl Rule for AfterRule {
    fn name(&self) -> &str {
        "after"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str().and_then(parse_normalized) else {
            return Ok(());
        };
        let Some(limit) = options
            .and_then(|opts| opts.get("limit"))
            .and_then(Value::as_str)
            .and_then(parse_normalized)
        else {
            return Ok(());
        };
        if value <= limit {
            field.report(
                "The {{ field }} field must be a date after {{ limit }}",
                "after",
                options.cloned(),
            );
        }
        Ok(())
    }
}

/// Requires the date to fall strictly before a limit date.
#[derive(Debug, Default)]
pub struct BeforeRule;

impl Rule for BeforeRule {
    fn name(&self) -> &str {
        "before"
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        let Some(value) = field.value.as_str().and_then(parse_normalized) else {
            return Ok(());
        };
        let Some(limit) = options
            .and_then(|opts| opts.get("limit"))
            .and_then(Value::as_str)
            .and_then(parse_normalized)
        else {
            return Ok(());
        };
        if value >= limit {
            field.report(
                "The {{ field }} field must be a date before {{ limit }}",
                "before",
                options.cloned(),
            );
        }
        Ok(())
    }
}
