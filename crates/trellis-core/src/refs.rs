use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::field::FieldContext;
use crate::ir::RefId;
use crate::rule::{Predicate, Rule};

/// Signature of a dispatch fallback handler.
pub type OtherwiseFn = dyn Fn(&mut FieldContext<'_>) + Send + Sync;

/// Signature of an unknown-property merge transform.
pub type TransformFn = dyn Fn(Value) -> Value + Send + Sync;

/// Callback kinds the IR can reference by id.
#[derive(Clone)]
pub enum RefEntry {
    /// A rule with the options captured at attachment time.
    Rule {
        rule: Arc<dyn Rule>,
        options: Option<Value>,
    },
    /// A union or group branch predicate.
    Predicate(Arc<dyn Predicate>),
    /// Fallback invoked when no branch of a dispatch list matches.
    Otherwise(Arc<OtherwiseFn>),
    /// Transform applied to unknown object properties before merging.
    Transform(Arc<TransformFn>),
}

impl fmt::Debug for RefEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefEntry::Rule { rule, options } => f
                .debug_struct("Rule")
                .field("name", &rule.name())
                .field("options", options)
                .finish(),
            RefEntry::Predicate(_) => f.write_str("Predicate"),
            RefEntry::Otherwise(_) => f.write_str("Otherwise"),
            RefEntry::Transform(_) => f.write_str("Transform"),
        }
    }
}

/// Per-compile side table holding the runtime callbacks the static IR
/// cannot represent.
///
/// Every id emitted into the IR during one compile call resolves here at
/// execution time. The store is immutable once compilation finishes and is
/// safely shared (read-only) across concurrent validation calls.
#[derive(Debug, Default, Clone)]
pub struct RefsStore {
    entries: Vec<RefEntry>,
}

impl RefsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a callback and return its id. Ids are monotonically
    /// increasing and stable for the lifetime of one compile call.
    pub fn track(&mut self, entry: RefEntry) -> RefId {
        let id = RefId(self.entries.len() as u32);
        self.entries.push(entry);
        id
    }

    pub fn resolve(&self, id: RefId) -> Result<&RefEntry> {
        self.entries
            .get(id.0 as usize)
            .ok_or(Error::UnresolvedRef(id))
    }

    /// Resolve a rule ref or fail with a kind mismatch.
    pub fn rule(&self, id: RefId) -> Result<(&dyn Rule, Option<&Value>)> {
        match self.resolve(id)? {
            RefEntry::Rule { rule, options } => Ok((rule.as_ref(), options.as_ref())),
            _ => Err(Error::RefKind {
                id,
                expected: "rule",
            }),
        }
    }

    pub fn predicate(&self, id: RefId) -> Result<&dyn Predicate> {
        match self.resolve(id)? {
            RefEntry::Predicate(predicate) => Ok(predicate.as_ref()),
            _ => Err(Error::RefKind {
                id,
                expected: "predicate",
            }),
        }
    }

    pub fn otherwise(&self, id: RefId) -> Result<&OtherwiseFn> {
        match self.resolve(id)? {
            RefEntry::Otherwise(handler) => Ok(handler.as_ref()),
            _ => Err(Error::RefKind {
                id,
                expected: "otherwise handler",
            }),
        }
    }

    pub fn transform(&self, id: RefId) -> Result<&TransformFn> {
        match self.resolve(id)? {
            RefEntry::Transform(transform) => Ok(transform.as_ref()),
            _ => Err(Error::RefKind {
                id,
                expected: "transform",
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
