use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single reported validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Formatted human message.
    pub message: String,
    /// Name of the failing rule.
    pub rule: String,
    /// Dotted path of the field within the root input.
    pub field: String,
    /// Rule-provided arguments (bounds, choices, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

/// Accumulates structured errors for one validation run.
///
/// Exactly one reporter instance exists per run and is shared by every
/// field context in that run.
pub trait ErrorReporter: Send + Sync {
    /// Append an error. Order of reports is preserved.
    fn report(&mut self, error: ValidationError);

    fn has_errors(&self) -> bool;

    /// Drain the accumulated errors in report order.
    fn take_errors(&mut self) -> Vec<ValidationError>;
}

/// Default reporter backed by a vector.
#[derive(Debug, Default)]
pub struct SimpleErrorReporter {
    errors: Vec<ValidationError>,
}

impl SimpleErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorReporter for SimpleErrorReporter {
    fn report(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn take_errors(&mut self) -> Vec<ValidationError> {
        std::mem::take(&mut self.errors)
    }
}

/// Aggregate failure produced when a run reports at least one error.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("validation failed with {} error(s)", .errors.len())]
pub struct ErrorReport {
    /// Every reported error, in report order.
    pub errors: Vec<ValidationError>,
}

impl ErrorReport {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Messages only, in report order.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}
