use std::sync::Arc;

use serde_json::Value;
use trellis_core::{IrNode, RefsStore, Rule, RuleUse, TupleIr};

use crate::base::NodeBase;
use crate::compile::CompileOptions;
use crate::node::SchemaNode;
use crate::rules::ArrayRule;

/// Schema for fixed-position arrays.
///
/// Members are validated positionally; a missing position is treated as
/// an absent field with the member's own required/optional semantics.
#[derive(Debug, Clone)]
pub struct TupleSchema {
    base: NodeBase,
    members: Vec<SchemaNode>,
    allow_unknown: bool,
}

impl TupleSchema {
    pub(crate) fn new() -> Self {
        Self {
            base: NodeBase::new(),
            members: Vec::new(),
            allow_unknown: false,
        }
    }

    /// Append a positional member schema.
    pub fn member(mut self, schema: impl Into<SchemaNode>) -> Self {
        self.members.push(schema.into());
        self
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

    /// Pass elements beyond the declared members through unchanged.
    pub fn allow_unknown_properties(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, options: &CompileOptions) -> IrNode {
        let leading = RuleUse::new(Arc::new(ArrayRule));
        IrNode::Tuple(TupleIr {
            node: self.base.compile(Some(leading), refs),
            members: self
                .members
                .iter()
                .map(|member| member.compile_to_ir(refs, options))
                .collect(),
            allow_unknown_properties: self.allow_unknown,
        })
    }
}
