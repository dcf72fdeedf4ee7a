use std::sync::Arc;

use serde_json::Value;
use trellis_core::{NodeIr, RefEntry, RefsStore, Rule, RuleUse, ValidationIr};

/// State shared by every schema builder: the attached rule list plus
/// acceptance flags for absent and null values.
///
/// Builders clone this wholesale, so a clone's rule list never aliases
/// the original.
#[derive(Debug, Clone)]
pub(crate) struct NodeBase {
    pub rules: Vec<RuleUse>,
    pub is_optional: bool,
    pub allow_null: bool,
    pub bail: bool,
}

impl NodeBase {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            is_optional: false,
            allow_null: false,
            bail: true,
        }
    }

    pub fn push(&mut self, rule: Arc<dyn Rule>, options: Option<Value>) {
        self.rules.push(RuleUse { rule, options });
    }

    /// Lower the flags and rule list, tracking one ref per rule.
    ///
    /// `leading` is the node's type-check rule; it always runs first.
    pub fn compile(&self, leading: Option<RuleUse>, refs: &mut RefsStore) -> NodeIr {
        let mut validations = Vec::with_capacity(self.rules.len() + 1);
        for rule_use in leading.iter().chain(self.rules.iter()) {
            validations.push(ValidationIr {
                implicit: rule_use.rule.implicit(),
                is_async: rule_use.rule.is_async(),
                rule_ref: refs.track(RefEntry::Rule {
                    rule: rule_use.rule.clone(),
                    options: rule_use.options.clone(),
                }),
            });
        }
        NodeIr {
            is_optional: self.is_optional,
            allow_null: self.allow_null,
            bail: self.bail,
            validations,
        }
    }
}
