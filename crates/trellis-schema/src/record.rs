use std::sync::Arc;

use serde_json::Value;
use trellis_core::{IrNode, RecordIr, RefsStore, Rule, RuleUse};

use crate::base::NodeBase;
use crate::compile::CompileOptions;
use crate::node::SchemaNode;
use crate::rules::ObjectRule;

/// Schema for objects with arbitrary keys and a uniform value shape.
///
/// Keys are preserved verbatim in the output.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    base: NodeBase,
    each: Box<SchemaNode>,
}

impl RecordSchema {
    pub(crate) fn new(each: SchemaNode) -> Self {
        Self {
            base: NodeBase::new(),
            each: Box::new(each),
        }
    }

    /// Accept absent values and omit them from the output.
    pub fn optional(mut self) -> Self {
        self.base.is_optional = true;
        self
    }

    /// Accept null and produce a null output without running rules.
    pub fn nullable(mut self) -> Self {
        self.base.allow_null = true;
        self
    }

    /// Toggle per-field short-circuiting (enabled by default).
    pub fn bail(mut self, bail: bool) -> Self {
        self.base.bail = bail;
        self
    }

    /// Attach a custom rule with optional JSON options.
    pub fn use_rule(mut self, rule: Arc<dyn Rule>, options: Option<Value>) -> Self {
        self.base.push(rule, options);
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, options: &CompileOptions) -> IrNode {
        let leading = RuleUse::new(Arc::new(ObjectRule));
        IrNode::Record(RecordIr {
            node: self.base.compile(Some(leading), refs),
            each: Box::new(self.each.compile_to_ir(refs, options)),
        })
    }
}
