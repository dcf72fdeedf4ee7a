use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::field::FieldContext;
use crate::report::ValidationError;

/// A named, possibly parameterized unit of validation or transformation.
///
/// Rules signal data failures through [`FieldContext::report`]; the
/// `Result` return is reserved for contract errors such as an async rule
/// reached through the synchronous path.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Name used for error entries and message lookup.
    fn name(&self) -> &str;

    /// Whether the rule must run through the asynchronous path.
    fn is_async(&self) -> bool {
        false
    }

    /// Implicit rules run even when the field is absent.
    fn implicit(&self) -> bool {
        false
    }

    /// Apply the rule synchronously.
    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()>;

    /// Apply the rule on the asynchronous path.
    ///
    /// Defaults to the synchronous body. Async rules override this and
    /// leave `check` returning [`crate::Error::AsyncRule`].
    async fn check_async(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        self.check(field, options)
    }
}

/// A rule paired with the options captured at attachment time.
#[derive(Clone)]
pub struct RuleUse {
    pub rule: Arc<dyn Rule>,
    pub options: Option<Value>,
}

impl RuleUse {
    pub fn new(rule: Arc<dyn Rule>) -> Self {
        Self { rule, options: None }
    }

    pub fn with_options(rule: Arc<dyn Rule>, options: Value) -> Self {
        Self {
            rule,
            options: Some(options),
        }
    }
}

impl std::fmt::Debug for RuleUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleUse")
            .field("rule", &self.rule.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Branch predicate for union and group dispatch.
///
/// Dispatch lists may mix sync and async predicates. The asynchronous
/// path awaits `test_async` for every entry in declaration order; the
/// synchronous path calls `test` and fails fast with a contract error on
/// any predicate whose `is_async` is true.
#[async_trait]
pub trait Predicate: Send + Sync {
    fn is_async(&self) -> bool {
        false
    }

    /// Decide whether this branch claims the field.
    fn test(&self, field: &FieldContext<'_>) -> bool;

    async fn test_async(&self, field: &FieldContext<'_>) -> bool {
        self.test(field)
    }
}

/// Validates caller-supplied metadata before any field processing.
///
/// A failure aborts the run; the returned errors become the whole report.
pub trait MetadataValidator: Send + Sync {
    fn validate(&self, meta: &Value) -> std::result::Result<(), Vec<ValidationError>>;
}

/// Wrap a closure as a named synchronous rule.
pub fn rule_fn<F>(name: &'static str, f: F) -> Arc<dyn Rule>
where
    F: Fn(&mut FieldContext<'_>, Option<&Value>) + Send + Sync + 'static,
{
    Arc::new(FnRule {
        name,
        implicit: false,
        f,
    })
}

/// Wrap a closure as a named implicit rule (runs on absent fields).
pub fn implicit_rule_fn<F>(name: &'static str, f: F) -> Arc<dyn Rule>
where
    F: Fn(&mut FieldContext<'_>, Option<&Value>) + Send + Sync + 'static,
{
    Arc::new(FnRule {
        name,
        implicit: true,
        f,
    })
}

struct FnRule<F> {
    name: &'static str,
    implicit: bool,
    f: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&mut FieldContext<'_>, Option<&Value>) + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn implicit(&self) -> bool {
        self.implicit
    }

    fn check(&self, field: &mut FieldContext<'_>, options: Option<&Value>) -> Result<()> {
        (self.f)(field, options);
        Ok(())
    }
}

/// Wrap a closure as a synchronous predicate.
pub fn predicate_fn<F>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(FnPredicate { f })
}

struct FnPredicate<F> {
    f: F,
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
{
    fn test(&self, field: &FieldContext<'_>) -> bool {
        (self.f)(field)
    }
}
