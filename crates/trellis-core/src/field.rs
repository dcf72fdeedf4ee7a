use serde_json::Value;

use crate::messages::MessagesProvider;
use crate::report::{ErrorReporter, ValidationError};

/// Local name of a field within its parent container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldName {
    Root,
    Key(String),
    Index(usize),
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldName::Root => Ok(()),
            FieldName::Key(key) => write!(f, "{key}"),
            FieldName::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Address of a field: local name plus root-relative paths.
#[derive(Debug, Clone)]
pub struct FieldPosition {
    pub name: FieldName,
    /// Dotted path from the root, e.g. `contacts.0.email`.
    pub path: String,
    /// Same path with array indexes replaced by `*`.
    pub wildcard_path: String,
    pub is_array_member: bool,
}

impl FieldPosition {
    /// Position of the root input value.
    pub fn root() -> Self {
        Self {
            name: FieldName::Root,
            path: String::new(),
            wildcard_path: String::new(),
            is_array_member: false,
        }
    }

    /// Position of an object property under this one.
    pub fn key(&self, name: &str) -> Self {
        Self {
            name: FieldName::Key(name.to_string()),
            path: join(&self.path, name),
            wildcard_path: join(&self.wildcard_path, name),
            is_array_member: false,
        }
    }

    /// Position of an array element under this one.
    pub fn index(&self, index: usize) -> Self {
        Self {
            name: FieldName::Index(index),
            path: join(&self.path, &index.to_string()),
            wildcard_path: join(&self.wildcard_path, "*"),
            is_array_member: true,
        }
    }
}

fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

/// Runtime state for one position in the input tree during a single
/// validation pass.
///
/// Created once per field position per run and never persisted across
/// runs. Child contexts are created by composite nodes and are independent
/// of their siblings except for the shared reporter and root data.
pub struct FieldContext<'a> {
    pub position: FieldPosition,
    /// Current value. [`FieldContext::mutate`] is the only sanctioned way
    /// a rule changes what later rules and the output see.
    pub value: Value,
    /// False when the key/index was absent from the input. Absence means
    /// exactly "not present"; an explicit null is defined.
    pub is_defined: bool,
    /// Flips to false on the first reported error for this field.
    pub is_valid: bool,
    /// Root input value.
    pub data: &'a Value,
    /// Caller-supplied metadata shared by the whole run.
    pub meta: &'a Value,
    reporter: &'a mut dyn ErrorReporter,
    messages: &'a dyn MessagesProvider,
}

impl<'a> FieldContext<'a> {
    pub fn new(
        position: FieldPosition,
        value: Value,
        is_defined: bool,
        data: &'a Value,
        meta: &'a Value,
        reporter: &'a mut dyn ErrorReporter,
        messages: &'a dyn MessagesProvider,
    ) -> Self {
        Self {
            position,
            value,
            is_defined,
            is_valid: true,
            data,
            meta,
            reporter,
            messages,
        }
    }

    /// Dotted path of this field within the root input.
    pub fn path(&self) -> &str {
        &self.position.path
    }

    /// Append a structured error for this field and mark it invalid.
    ///
    /// The message template is resolved through the run's messages
    /// provider before it reaches the reporter.
    pub fn report(&mut self, default_message: &str, rule: &str, args: Option<Value>) {
        let message = self.messages.get_message(
            default_message,
            rule,
            &self.position.path,
            &self.position.wildcard_path,
            args.as_ref(),
        );
        self.is_valid = false;
        self.reporter.report(ValidationError {
            message,
            rule: rule.to_string(),
            field: self.position.path.clone(),
            args,
        });
    }

    /// Replace the value seen by subsequent rules and the final output.
    pub fn mutate(&mut self, value: Value) {
        self.value = value;
    }

    /// Look up a sibling field's raw input value by key.
    pub fn sibling(&self, key: &str) -> Option<&Value> {
        let parent = match self.position.path.rsplit_once('.') {
            Some((parent, _)) => lookup(self.data, parent)?,
            None => self.data,
        };
        parent.get(key)
    }
}

/// Walk a dotted path through a value tree.
fn lookup<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SimpleMessagesProvider;
    use crate::report::SimpleErrorReporter;
    use serde_json::json;

    #[test]
    fn sibling_resolves_through_nested_paths() {
        let data = json!({
            "credentials": { "password": "secret", "password_confirmation": "secret" }
        });
        let meta = Value::Null;
        let mut reporter = SimpleErrorReporter::new();
        let messages = SimpleMessagesProvider::new();

        let position = FieldPosition::root().key("credentials").key("password");
        let ctx = FieldContext::new(
            position,
            json!("secret"),
            true,
            &data,
            &meta,
            &mut reporter,
            &messages,
        );

        assert_eq!(
            ctx.sibling("password_confirmation"),
            Some(&json!("secret"))
        );
        assert_eq!(ctx.sibling("missing"), None);
    }

    #[test]
    fn report_flips_validity_and_records_path() {
        let data = json!({ "age": "x" });
        let meta = Value::Null;
        let mut reporter = SimpleErrorReporter::new();
        let messages = SimpleMessagesProvider::new();

        let mut ctx = FieldContext::new(
            FieldPosition::root().key("age"),
            json!("x"),
            true,
            &data,
            &meta,
            &mut reporter,
            &messages,
        );
        ctx.report("The {{ field }} field must be a number", "number", None);

        assert!(!ctx.is_valid);
        let errors = reporter.take_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "age");
        assert_eq!(errors[0].message, "The age field must be a number");
    }
}
