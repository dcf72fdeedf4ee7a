use thiserror::Error;
use trellis_core::{ErrorReport, ValidationError};

/// Errors surfaced by validator execution.
///
/// `Failed` carries expected, data-driven validation errors; every other
/// variant indicates API misuse or an output-shape mismatch.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// Input failed validation; the report holds every error in order.
    #[error(transparent)]
    Failed(#[from] ErrorReport),
    /// API misuse detected while executing the compiled program.
    #[error(transparent)]
    Contract(#[from] trellis_core::Error),
    /// The validated output did not deserialize into the requested type.
    #[error("output deserialization failed: {0}")]
    Output(#[from] serde_json::Error),
}

impl ValidateError {
    /// Reported validation errors when this is a validation failure.
    pub fn errors(&self) -> Option<&[ValidationError]> {
        match self {
            ValidateError::Failed(report) => Some(&report.errors),
            _ => None,
        }
    }
}
