use std::sync::Arc;

use serde_json::{Value, json};
use trellis_core::{ArrayIr, IrNode, RefsStore, Rule, RuleUse};

use crate::base::NodeBase;
use crate::compile::CompileOptions;
use crate::node::SchemaNode;
use crate::rules::{ArrayMaxLengthRule, ArrayMinLengthRule, ArrayRule, DistinctRule, NotEmptyRule};

/// Schema for arrays with a uniform element shape.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    base: NodeBase,
    each: Box<SchemaNode>,
}

impl ArraySchema {
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

    pub fn min_length(mut self, min: u64) -> Self {
        self.base
            .push(Arc::new(ArrayMinLengthRule), Some(json!({ "min": min })));
        self
    }

    pub fn max_length(mut self, max: u64) -> Self {
        self.base
            .push(Arc::new(ArrayMaxLengthRule), Some(json!({ "max": max })));
        self
    }

    pub fn not_empty(mut self) -> Self {
        self.base.push(Arc::new(NotEmptyRule), None);
        self
    }

    /// Reject duplicate elements.
    pub fn distinct(mut self) -> Self {
        self.base.push(Arc::new(DistinctRule), None);
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, options: &CompileOptions) -> IrNode {
        let leading = RuleUse::new(Arc::new(ArrayRule));
        IrNode::Array(ArrayIr {
            node: self.base.compile(Some(leading), refs),
            each: Box::new(self.each.compile_to_ir(refs, options)),
        })
    }
}
