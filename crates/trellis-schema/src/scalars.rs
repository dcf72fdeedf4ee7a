use std::sync::Arc;

use regex::Regex;
use serde_json::{Value, json};
use trellis_core::{IrNode, LiteralIr, RefsStore, Rule, RuleUse};

use crate::base::NodeBase;
use crate::compile::CompileOptions;
use crate::rules::{
    AcceptedRule, AfterRule, BeforeRule, BooleanRule, ConfirmedRule, DateRule, DecimalRule,
    EmailRule, EndsWithRule, EnumRule, FixedLengthRule, IntegerRule, LiteralRule, LowercaseRule,
    MaxLengthRule, MaxRule, MinLengthRule, MinRule, NegativeRule, NumberRule, PositiveRule,
    RangeRule, RegexRule, StartsWithRule, StringRule, TrimRule, UrlRule, UuidRule,
};

/// Schema for string values.
#[derive(Debug, Clone)]
pub struct StringSchema {
    base: NodeBase,
}

impl StringSchema {
    pub(crate) fn new() -> Self {
        Self {
            base: NodeBase::new(),
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
            .push(Arc::new(MinLengthRule), Some(json!({ "min": min })));
        self
    }

    pub fn max_length(mut self, max: u64) -> Self {
        self.base
            .push(Arc::new(MaxLengthRule), Some(json!({ "max": max })));
        self
    }

    pub fn fixed_length(mut self, length: u64) -> Self {
        self.base
            .push(Arc::new(FixedLengthRule), Some(json!({ "length": length })));
        self
    }

    pub fn email(mut self) -> Self {
        self.base.push(Arc::new(EmailRule), None);
        self
    }

    pub fn url(mut self) -> Self {
        self.base.push(Arc::new(UrlRule), None);
        self
    }

    pub fn uuid(mut self) -> Self {
        self.base.push(Arc::new(UuidRule), None);
        self
    }

    /// Match against a caller-compiled pattern.
    pub fn matches(mut self, pattern: Regex) -> Self {
        self.base.push(Arc::new(RegexRule::new(pattern)), None);
        self
    }

    pub fn starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.base.push(
            Arc::new(StartsWithRule),
            Some(json!({ "prefix": prefix.into() })),
        );
        self
    }

    pub fn ends_with(mut self, suffix: impl Into<String>) -> Self {
        self.base.push(
            Arc::new(EndsWithRule),
            Some(json!({ "suffix": suffix.into() })),
        );
        self
    }

    /// Require an equal sibling `<field>_confirmation` value, or the
    /// named sibling when given.
    pub fn confirmed(mut self, confirmation_field: Option<&str>) -> Self {
        let options = confirmation_field.map(|name| json!({ "confirmation_field": name }));
        self.base.push(Arc::new(ConfirmedRule), options);
        self
    }

    /// Trim surrounding whitespace before later rules run.
    pub fn trim(mut self) -> Self {
        self.base.push(Arc::new(TrimRule), None);
        self
    }

    pub fn to_lowercase(mut self) -> Self {
        self.base.push(Arc::new(LowercaseRule), None);
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, _options: &CompileOptions) -> IrNode {
        let leading = RuleUse::new(Arc::new(StringRule));
        IrNode::Literal(LiteralIr {
            node: self.base.compile(Some(leading), refs),
        })
    }
}

/// Schema for numeric values. Numeric strings coerce by mutation.
#[derive(Debug, Clone)]
pub struct NumberSchema {
    base: NodeBase,
}

impl NumberSchema {
    pub(crate) fn new() -> Self {
        Self {
            base: NodeBase::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.base.is_optional = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.base.allow_null = true;
        self
    }

    pub fn bail(mut self, bail: bool) -> Self {
        self.base.bail = bail;
        self
    }

    pub fn use_rule(mut self, rule: Arc<dyn Rule>, options: Option<Value>) -> Self {
        self.base.push(rule, options);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.base.push(Arc::new(MinRule), Some(json!({ "min": min })));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.base.push(Arc::new(MaxRule), Some(json!({ "max": max })));
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.base
            .push(Arc::new(RangeRule), Some(json!({ "min": min, "max": max })));
        self
    }

    pub fn positive(mut self) -> Self {
        self.base.push(Arc::new(PositiveRule), None);
        self
    }

    pub fn negative(mut self) -> Self {
        self.base.push(Arc::new(NegativeRule), None);
        self
    }

    /// Reject fractional values.
    pub fn integer(mut self) -> Self {
        self.base.push(Arc::new(IntegerRule), None);
        self
    }

    /// Bound the number of decimal places.
    pub fn decimal(mut self, min_places: u64, max_places: u64) -> Self {
        self.base.push(
            Arc::new(DecimalRule),
            Some(json!({ "min_places": min_places, "max_places": max_places })),
        );
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, _options: &CompileOptions) -> IrNode {
        let leading = RuleUse::new(Arc::new(NumberRule));
        IrNode::Literal(LiteralIr {
            node: self.base.compile(Some(leading), refs),
        })
    }
}

/// Schema for boolean values.
#[derive(Debug, Clone)]
pub struct BooleanSchema {
    base: NodeBase,
    strict: bool,
}

impl BooleanSchema {
    pub(crate) fn new() -> Self {
        Self {
            base: NodeBase::new(),
            strict: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.base.is_optional = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.base.allow_null = true;
        self
    }

    pub fn bail(mut self, bail: bool) -> Self {
        self.base.bail = bail;
        self
    }

    pub fn use_rule(mut self, rule: Arc<dyn Rule>, options: Option<Value>) -> Self {
        self.base.push(rule, options);
        self
    }

    /// Disable string and numeric coercion.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, _options: &CompileOptions) -> IrNode {
        let leading =
            RuleUse::with_options(Arc::new(BooleanRule), json!({ "strict": self.strict }));
        IrNode::Literal(LiteralIr {
            node: self.base.compile(Some(leading), refs),
        })
    }
}

/// Schema for date strings, normalized to ISO form on success.
#[derive(Debug, Clone)]
pub struct DateSchema {
    base: NodeBase,
    formats: Option<Vec<String>>,
}

impl DateSchema {
    pub(crate) fn new() -> Self {
        Self {
            base: NodeBase::new(),
            formats: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.base.is_optional = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.base.allow_null = true;
        self
    }

    pub fn bail(mut self, bail: bool) -> Self {
        self.base.bail = bail;
        self
    }

    pub fn use_rule(mut self, rule: Arc<dyn Rule>, options: Option<Value>) -> Self {
        self.base.push(rule, options);
        self
    }

    /// Replace the accepted `chrono` format strings.
    pub fn formats(mut self, formats: &[&str]) -> Self {
        self.formats = Some(formats.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn after(mut self, limit: &str) -> Self {
        self.base
            .push(Arc::new(AfterRule), Some(json!({ "limit": limit })));
        self
    }

    pub fn before(mut self, limit: &str) -> Self {
        self.base
            .push(Arc::new(BeforeRule), Some(json!({ "limit": limit })));
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, _options: &CompileOptions) -> IrNode {
        let leading = match &self.formats {
            Some(formats) => {
                RuleUse::with_options(Arc::new(DateRule), json!({ "formats": formats }))
            }
            None => RuleUse::new(Arc::new(DateRule)),
        };
        IrNode::Literal(LiteralIr {
            node: self.base.compile(Some(leading), refs),
        })
    }
}

/// Schema restricting the value to a declared set of choices.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    base: NodeBase,
    choices: Vec<Value>,
}

impl EnumSchema {
    pub(crate) fn new(choices: Vec<Value>) -> Self {
        Self {
            base: NodeBase::new(),
            choices,
        }
    }

    pub fn optional(mut self) -> Self {
        self.base.is_optional = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.base.allow_null = true;
        self
    }

    pub fn bail(mut self, bail: bool) -> Self {
        self.base.bail = bail;
        self
    }

    pub fn use_rule(mut self, rule: Arc<dyn Rule>, options: Option<Value>) -> Self {
        self.base.push(rule, options);
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, _options: &CompileOptions) -> IrNode {
        let leading =
            RuleUse::with_options(Arc::new(EnumRule), json!({ "choices": self.choices }));
        IrNode::Literal(LiteralIr {
            node: self.base.compile(Some(leading), refs),
        })
    }
}

/// Checkbox-style acceptance schema; output is always `true`.
#[derive(Debug, Clone)]
pub struct AcceptedSchema {
    base: NodeBase,
}

impl AcceptedSchema {
    pub(crate) fn new() -> Self {
        Self {
            base: NodeBase::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.base.is_optional = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.base.allow_null = true;
        self
    }

    pub fn bail(mut self, bail: bool) -> Self {
        self.base.bail = bail;
        self
    }

    pub fn use_rule(mut self, rule: Arc<dyn Rule>, options: Option<Value>) -> Self {
        self.base.push(rule, options);
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, _options: &CompileOptions) -> IrNode {
        let leading = RuleUse::new(Arc::new(AcceptedRule));
        IrNode::Literal(LiteralIr {
            node: self.base.compile(Some(leading), refs),
        })
    }
}

/// Schema requiring a single expected literal value.
#[derive(Debug, Clone)]
pub struct LiteralSchema {
    base: NodeBase,
    expected: Value,
}

impl LiteralSchema {
    pub(crate) fn new(expected: Value) -> Self {
        Self {
            base: NodeBase::new(),
            expected,
        }
    }

    pub fn optional(mut self) -> Self {
        self.base.is_optional = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.base.allow_null = true;
        self
    }

    pub fn bail(mut self, bail: bool) -> Self {
        self.base.bail = bail;
        self
    }

    pub fn use_rule(mut self, rule: Arc<dyn Rule>, options: Option<Value>) -> Self {
        self.base.push(rule, options);
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, _options: &CompileOptions) -> IrNode {
        let leading =
            RuleUse::with_options(Arc::new(LiteralRule), json!({ "expected": self.expected }));
        IrNode::Literal(LiteralIr {
            node: self.base.compile(Some(leading), refs),
        })
    }
}
