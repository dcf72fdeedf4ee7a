use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use trellis_core::{Error, ValidationError};
use trellis_engine::{ValidateError, ValidateOptions, Validator, compile};
use trellis_schema::{
    CompileOptions, SchemaNode, group, literal, number, object, string, union, union_of_types,
};

fn expect_errors(validator: &Validator, input: Value) -> Vec<ValidationError> {
    match validator.validate_sync(input, ValidateOptions::default()) {
        Err(ValidateError::Failed(report)) => report.errors,
        Err(other) => panic!("expected validation failure, got {other}"),
        Ok(output) => panic!("expected validation failure, got output {output}"),
    }
}

fn contact_union() -> SchemaNode {
    union()
        .when_fn(
            |field| field.value.get("type") == Some(&json!("email")),
            object()
                .field("type", literal("email"))
                .field("address", string().email()),
        )
        .when_fn(
            |field| field.value.get("type") == Some(&json!("phone")),
            object()
                .field("type", literal("phone"))
                .field("digits", string().min_length(8)),
        )
        .into()
}

#[test]
fn first_matching_branch_wins_and_validates_fully() {
    let validator = compile(&contact_union(), &CompileOptions::default());

    let output = validator
        .validate_sync(
            json!({ "type": "phone", "digits": "12345678" }),
            ValidateOptions::default(),
        )
        .expect("phone branch validates");
    assert_eq!(output, json!({ "type": "phone", "digits": "12345678" }));

    // The winning branch is validated with normal composite semantics:
    // results match validating against that branch alone.
    let branch: SchemaNode = object()
        .field("type", literal("phone"))
        .field("digits", string().min_length(8))
        .into();
    let standalone = compile(&branch, &CompileOptions::default());

    let via_union = expect_errors(&validator, json!({ "type": "phone", "digits": "123" }));
    let direct = expect_errors(&standalone, json!({ "type": "phone", "digits": "123" }));
    assert_eq!(via_union, direct);
}

#[test]
fn no_matching_branch_reports_generic_union_error() {
    let validator = compile(&contact_union(), &CompileOptions::default());

    let errors = expect_errors(&validator, json!({ "type": "fax" }));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "union");
}

#[test]
fn custom_otherwise_handler_reports_instead() {
    let schema: SchemaNode = union()
        .when_fn(|field| field.value.is_string(), string())
        .otherwise(|field| {
            field.report(
                "The {{ field }} field must be textual",
                "must_be_textual",
                None,
            );
        })
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let errors = expect_errors(&validator, json!(42));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "must_be_textual");
}

#[test]
fn union_predicates_evaluate_lazily() {
    let calls = Arc::new(AtomicUsize::new(0));
    let second_calls = Arc::clone(&calls);

    let schema: SchemaNode = union()
        .when_fn(|field| field.value.is_string(), string())
        .when_fn(
            move |_field| {
                second_calls.fetch_add(1, Ordering::SeqCst);
                true
            },
            number(),
        )
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    validator
        .validate_sync(json!("text"), ValidateOptions::default())
        .expect("first branch claims the value");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn union_of_types_dispatches_on_runtime_type() {
    let schema: SchemaNode = union_of_types(vec![
        string().min_length(2).into(),
        number().min(0.0).into(),
    ])
    .expect("discriminators are unique")
    .into();
    let validator = compile(&schema, &CompileOptions::default());

    assert_eq!(
        validator
            .validate_sync(json!("ok"), ValidateOptions::default())
            .expect("string branch"),
        json!("ok")
    );
    assert_eq!(
        validator
            .validate_sync(json!(7), ValidateOptions::default())
            .expect("number branch"),
        json!(7)
    );

    let errors = expect_errors(&validator, json!(true));
    assert_eq!(errors[0].rule, "union");
}

#[test]
fn union_of_types_rejects_duplicates_eagerly() {
    let result = union_of_types(vec![string().into(), string().min_length(2).into()]);
    match result {
        Err(Error::InvalidSchema(message)) => {
            assert!(message.contains("duplicate union type 'string'"));
        }
        other => panic!("expected InvalidSchema, got {other:?}"),
    }
}

#[test]
fn union_of_types_rejects_non_discriminable_members() {
    let result = union_of_types(vec![literal(1).into()]);
    match result {
        Err(Error::InvalidSchema(message)) => {
            assert!(message.contains("literal"));
        }
        other => panic!("expected InvalidSchema, got {other:?}"),
    }
}

fn payment_schema() -> SchemaNode {
    object()
        .field("amount", number().positive())
        .merge_group(
            group()
                .when_fn(
                    |field| field.value.get("method") == Some(&json!("card")),
                    object()
                        .field("method", literal("card"))
                        .field("card_number", string().fixed_length(16)),
                )
                .when_fn(
                    |field| field.value.get("method") == Some(&json!("transfer")),
                    object()
                        .field("method", literal("transfer"))
                        .field("iban", string().min_length(15)),
                ),
        )
        .into()
}

#[test]
fn matching_group_branch_merges_its_properties() {
    let validator = compile(&payment_schema(), &CompileOptions::default());

    let output = validator
        .validate_sync(
            json!({ "amount": 10, "method": "card", "card_number": "4242424242424242" }),
            ValidateOptions::default(),
        )
        .expect("card branch matches and validates");

    assert_eq!(
        output,
        json!({ "amount": 10, "method": "card", "card_number": "4242424242424242" })
    );
}

#[test]
fn group_branch_properties_are_validated() {
    let validator = compile(&payment_schema(), &CompileOptions::default());

    let errors = expect_errors(
        &validator,
        json!({ "amount": 10, "method": "card", "card_number": "42" }),
    );

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "card_number");
    assert_eq!(errors[0].rule, "fixed_length");
}

#[test]
fn no_matching_group_condition_reports_on_owning_object() {
    let validator = compile(&payment_schema(), &CompileOptions::default());

    let errors = expect_errors(&validator, json!({ "amount": 10, "method": "cash" }));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "group");
    assert_eq!(errors[0].field, "");
}

#[test]
fn group_custom_otherwise_reports_instead() {
    let schema: SchemaNode = object()
        .field("amount", number())
        .merge_group(
            group()
                .when_fn(
                    |field| field.value.get("method") == Some(&json!("card")),
                    object().field("card_number", string()),
                )
                .otherwise(|field| {
                    field.report(
                        "The {{ field }} field needs a payment method",
                        "payment_method_required",
                        None,
                    );
                }),
        )
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let errors = expect_errors(&validator, json!({ "amount": 10 }));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "payment_method_required");
}

#[test]
fn group_predicates_evaluate_lazily() {
    let calls = Arc::new(AtomicUsize::new(0));
    let second_calls = Arc::clone(&calls);

    let schema: SchemaNode = object()
        .merge_group(
            group()
                .when_fn(|_field| true, object().field("a", string().optional()))
                .when_fn(
                    move |_field| {
                        second_calls.fetch_add(1, Ordering::SeqCst);
                        true
                    },
                    object().field("b", string()),
                ),
        )
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    validator
        .validate_sync(json!({}), ValidateOptions::default())
        .expect("first branch matches");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
