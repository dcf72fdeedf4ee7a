use std::collections::HashMap;

use serde_json::Value;

/// Maps a failing rule and field to the final message string.
///
/// Providers are consulted by the field context at report time only; they
/// never influence control flow or the pass/fail outcome.
pub trait MessagesProvider: Send + Sync {
    /// Resolve the message for `rule` failing on the field at `path`.
    ///
    /// `default_message` is the rule's built-in template; `args` are the
    /// options the rule reported with.
    fn get_message(
        &self,
        default_message: &str,
        rule: &str,
        path: &str,
        wildcard_path: &str,
        args: Option<&Value>,
    ) -> String;
}

/// Provider with per-rule and per-field overrides and display names.
///
/// Override keys are looked up as `path.rule`, then `wildcard_path.rule`,
/// then `rule`. Templates may reference `{{ field }}` and any key of the
/// rule's args object.
#[derive(Debug, Default, Clone)]
pub struct SimpleMessagesProvider {
    messages: HashMap<String, String>,
    fields: HashMap<String, String>,
}

impl SimpleMessagesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a message template for a rule or `field.rule` key.
    pub fn message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    /// Register a display name for a field path.
    pub fn field(mut self, path: impl Into<String>, display: impl Into<String>) -> Self {
        self.fields.insert(path.into(), display.into());
        self
    }

    fn display_name<'a>(&'a self, path: &'a str) -> &'a str {
        if let Some(display) = self.fields.get(path) {
            return display;
        }
        let last = path.rsplit('.').next().unwrap_or(path);
        if last.is_empty() { "value" } else { last }
    }
}

impl MessagesProvider for SimpleMessagesProvider {
    fn get_message(
        &self,
        default_message: &str,
        rule: &str,
        path: &str,
        wildcard_path: &str,
        args: Option<&Value>,
    ) -> String {
        let template = self
            .messages
            .get(&format!("{path}.{rule}"))
            .or_else(|| self.messages.get(&format!("{wildcard_path}.{rule}")))
            .or_else(|| self.messages.get(rule))
            .map(String::as_str)
            .unwrap_or(default_message);

        interpolate(template, self.display_name(path), args)
    }
}

/// Substitute `{{ field }}` and `{{ <args key> }}` placeholders.
fn interpolate(template: &str, field: &str, args: Option<&Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = after[..end].trim();
        if key == "field" {
            out.push_str(field);
        } else if let Some(value) = args.and_then(|args| args.get(key)) {
            match value {
                Value::String(text) => out.push_str(text),
                other => out.push_str(&other.to_string()),
            }
        } else {
            // Unknown placeholder stays verbatim.
            out.push_str(&rest[start..start + 2 + end + 2]);
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_overrides_most_specific_first() {
        let provider = SimpleMessagesProvider::new()
            .message("min_length", "too short")
            .message("username.min_length", "username is too short");

        let specific =
            provider.get_message("The {{ field }} field is invalid", "min_length", "username", "username", None);
        assert_eq!(specific, "username is too short");

        let generic =
            provider.get_message("The {{ field }} field is invalid", "min_length", "nickname", "nickname", None);
        assert_eq!(generic, "too short");
    }

    #[test]
    fn interpolates_field_and_args() {
        let provider = SimpleMessagesProvider::new().field("profile.age", "age");
        let message = provider.get_message(
            "The {{ field }} field must be at least {{ min }}",
            "min",
            "profile.age",
            "profile.age",
            Some(&json!({ "min": 18 })),
        );
        assert_eq!(message, "The age field must be at least 18");
    }

    #[test]
    fn unknown_placeholder_is_preserved() {
        let provider = SimpleMessagesProvider::new();
        let message = provider.get_message("{{ field }}: {{ nope }}", "x", "name", "name", None);
        assert_eq!(message, "name: {{ nope }}");
    }
}
