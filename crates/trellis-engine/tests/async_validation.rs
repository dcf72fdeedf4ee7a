use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use trellis_core::{
    Error, FieldContext, MetadataValidator, Predicate, Result as CoreResult, Rule,
    ValidationError, rule_fn,
};
use trellis_engine::{ValidateError, ValidateOptions, compile};
use trellis_schema::{CompileOptions, SchemaNode, number, object, string, union};

/// Async rule standing in for a datastore uniqueness probe.
#[derive(Debug)]
struct UniqueUsernameRule;

#[async_trait]
impl Rule for UniqueUsernameRule {
    fn name(&self) -> &str {
        "unique_username"
    }

    fn is_async(&self) -> bool {
        true
    }

    fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> CoreResult<()> {
        Err(Error::async_rule(self.name(), field.path()))
    }

    async fn check_async(
        &self,
        field: &mut FieldContext<'_>,
        _options: Option<&Value>,
    ) -> CoreResult<()> {
        if field.value.as_str() == Some("taken") {
            field.report(
                "The {{ field }} field is already taken",
                "unique_username",
                None,
            );
        }
        Ok(())
    }
}

#[tokio::test]
async fn async_rule_reports_on_async_path() {
    let schema: SchemaNode = object()
        .field(
            "username",
            string().use_rule(Arc::new(UniqueUsernameRule), None),
        )
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let result = validator
        .validate(json!({ "username": "taken" }), ValidateOptions::default())
        .await;

    match result {
        Err(ValidateError::Failed(report)) => {
            assert_eq!(report.errors.len(), 1);
            assert_eq!(report.errors[0].rule, "unique_username");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    let output = validator
        .validate(json!({ "username": "fresh" }), ValidateOptions::default())
        .await
        .expect("available username passes");
    assert_eq!(output, json!({ "username": "fresh" }));
}

#[tokio::test]
async fn async_rules_observe_earlier_mutations_in_order() {
    /// Reports unless an earlier rule already uppercased the value.
    #[derive(Debug)]
    struct ExpectsUppercaseRule;

    #[async_trait]
    impl Rule for ExpectsUppercaseRule {
        fn name(&self) -> &str {
            "expects_uppercase"
        }

        fn is_async(&self) -> bool {
            true
        }

        fn check(&self, field: &mut FieldContext<'_>, _options: Option<&Value>) -> CoreResult<()> {
            Err(Error::async_rule(self.name(), field.path()))
        }

        async fn check_async(
            &self,
            field: &mut FieldContext<'_>,
            _options: Option<&Value>,
        ) -> CoreResult<()> {
            let uppercased = field
                .value
                .as_str()
                .is_some_and(|text| !text.chars().any(char::is_lowercase));
            if !uppercased {
                field.report(
                    "The {{ field }} field ran before the uppercase mutation",
                    "expects_uppercase",
                    None,
                );
            }
            Ok(())
        }
    }

    let uppercase = rule_fn("uppercase", |field, _options| {
        if let Some(text) = field.value.as_str() {
            field.mutate(Value::String(text.to_uppercase()));
        }
    });
    let schema: SchemaNode = object()
        .field(
            "code",
            string()
                .use_rule(uppercase, None)
                .use_rule(Arc::new(ExpectsUppercaseRule), None),
        )
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let output = validator
        .validate(json!({ "code": "abc" }), ValidateOptions::default())
        .await
        .expect("mutation from the sync rule is visible to the async rule");
    assert_eq!(output, json!({ "code": "ABC" }));
}

#[tokio::test]
async fn sync_path_rejects_async_rules_with_contract_error() {
    let schema: SchemaNode = object()
        .field(
            "username",
            string().use_rule(Arc::new(UniqueUsernameRule), None),
        )
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let result = validator.validate_sync(json!({ "username": "fresh" }), ValidateOptions::default());

    match result {
        Err(ValidateError::Contract(Error::AsyncRule { rule, field })) => {
            assert_eq!(rule, "unique_username");
            assert_eq!(field, "username");
        }
        other => panic!("expected contract error, got {other:?}"),
    }
}

/// Async predicate standing in for a feature-flag lookup.
struct AsyncFlagPredicate;

#[async_trait]
impl Predicate for AsyncFlagPredicate {
    fn is_async(&self) -> bool {
        true
    }

    fn test(&self, _field: &FieldContext<'_>) -> bool {
        false
    }

    async fn test_async(&self, field: &FieldContext<'_>) -> bool {
        field.value.is_string()
    }
}

#[tokio::test]
async fn async_predicates_dispatch_on_async_path_only() {
    let schema: SchemaNode = union()
        .when(Arc::new(AsyncFlagPredicate), string())
        .when_fn(|field| field.value.is_number(), number())
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let output = validator
        .validate(json!("text"), ValidateOptions::default())
        .await
        .expect("async predicate claims strings");
    assert_eq!(output, json!("text"));

    match validator.validate_sync(json!("text"), ValidateOptions::default()) {
        Err(ValidateError::Contract(Error::AsyncPredicate { .. })) => {}
        other => panic!("expected contract error, got {other:?}"),
    }
}

struct AdminOnlyMeta;

impl MetadataValidator for AdminOnlyMeta {
    fn validate(&self, meta: &Value) -> Result<(), Vec<ValidationError>> {
        if meta.get("role").and_then(Value::as_str) == Some("admin") {
            return Ok(());
        }
        Err(vec![ValidationError {
            message: "metadata role must be admin".to_string(),
            rule: "meta_role".to_string(),
            field: "meta.role".to_string(),
            args: None,
        }])
    }
}

#[tokio::test]
async fn metadata_failure_aborts_before_any_field_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let probe = {
        let calls = Arc::clone(&calls);
        rule_fn("probe", move |_field, _options| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    };

    let schema: SchemaNode = object()
        .field("name", string().use_rule(probe, None))
        .into();
    let validator =
        compile(&schema, &CompileOptions::default()).with_metadata_validator(Arc::new(AdminOnlyMeta));

    let result = validator
        .validate(
            json!({ "name": "virk" }),
            ValidateOptions::with_meta(json!({ "role": "x" })),
        )
        .await;

    match result {
        Err(ValidateError::Failed(report)) => {
            assert_eq!(report.errors.len(), 1);
            assert_eq!(report.errors[0].rule, "meta_role");
        }
        other => panic!("expected metadata failure, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0, "no field rule may run");

    let output = validator
        .validate(
            json!({ "name": "virk" }),
            ValidateOptions::with_meta(json!({ "role": "admin" })),
        )
        .await
        .expect("valid metadata lets the run proceed");
    assert_eq!(output, json!({ "name": "virk" }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rules_can_read_run_metadata() {
    let needs_flag = rule_fn("needs_flag", |field, _options| {
        if field.meta.get("allow").and_then(Value::as_bool) != Some(true) {
            field.report(
                "The {{ field }} field is not allowed by metadata",
                "needs_flag",
                None,
            );
        }
    });
    let schema: SchemaNode = object()
        .field("secret", string().use_rule(needs_flag, None))
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    validator
        .validate(
            json!({ "secret": "x" }),
            ValidateOptions::with_meta(json!({ "allow": true })),
        )
        .await
        .expect("metadata flag allows the field");

    let result = validator
        .validate(json!({ "secret": "x" }), ValidateOptions::default())
        .await;
    assert!(matches!(result, Err(ValidateError::Failed(_))));
}
