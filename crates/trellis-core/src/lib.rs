//! Core contracts for the Trellis validation pipeline.
//!
//! This crate defines the runtime and compile-time vocabulary shared by the
//! schema and engine crates: the field context, the rule and predicate
//! contracts, error reporting, message resolution, the compiled IR model,
//! and the refs store that carries runtime callbacks the IR references by
//! id.

pub mod error;
pub mod field;
pub mod ir;
pub mod messages;
pub mod refs;
pub mod report;
pub mod rule;

pub use error::{Error, Result};
pub use field::{FieldContext, FieldName, FieldPosition};
pub use ir::{
    ArrayIr, GroupConditionIr, GroupIr, IrNode, LiteralIr, NodeIr, ObjectIr, PropertyIr, RecordIr,
    RefId, TupleIr, UnionBranchIr, UnionIr, ValidationIr,
};
pub use messages::{MessagesProvider, SimpleMessagesProvider};
pub use refs::{OtherwiseFn, RefEntry, RefsStore, TransformFn};
pub use report::{ErrorReport, ErrorReporter, SimpleErrorReporter, ValidationError};
pub use rule::{
    implicit_rule_fn, predicate_fn, rule_fn, MetadataValidator, Predicate, Rule, RuleUse,
};
