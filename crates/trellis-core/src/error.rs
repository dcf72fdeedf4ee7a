use thiserror::Error;

use crate::ir::RefId;

/// Contract errors shared across Trellis crates.
///
/// These indicate API misuse, never bad input data. Data failures are
/// accumulated through the error reporter instead and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// A ref id emitted into the IR has no entry in the refs store.
    #[error("unresolved ref '{0}' in refs store")]
    UnresolvedRef(RefId),
    /// A ref id resolved to a different callback kind than expected.
    #[error("ref '{id}' is not a {expected}")]
    RefKind { id: RefId, expected: &'static str },
    /// An async rule was dispatched through the synchronous path.
    #[error("rule '{rule}' on field '{field}' is async and cannot run on the synchronous path")]
    AsyncRule { rule: String, field: String },
    /// An async predicate was dispatched through the synchronous path.
    #[error("predicate on field '{field}' is async and cannot run on the synchronous path")]
    AsyncPredicate { field: String },
    /// The schema tree violates a construction invariant.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl Error {
    /// Build the async-rule contract error for a rule and field path.
    pub fn async_rule(rule: &str, field: &str) -> Self {
        Error::AsyncRule {
            rule: rule.to_string(),
            field: field.to_string(),
        }
    }

    /// Build the async-predicate contract error for a field path.
    pub fn async_predicate(field: &str) -> Self {
        Error::AsyncPredicate {
            field: field.to_string(),
        }
    }
}

/// Convenience alias for results returned by Trellis crates.
pub type Result<T> = std::result::Result<T, Error>;
