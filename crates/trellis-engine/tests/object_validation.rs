use serde_json::{Value, json};
use trellis_core::ValidationError;
use trellis_engine::{ValidateError, ValidateOptions, Validator, compile};
use trellis_schema::{CompileOptions, SchemaNode, array, number, object, string};

fn expect_errors(validator: &Validator, input: Value) -> Vec<ValidationError> {
    match validator.validate_sync(input, ValidateOptions::default()) {
        Err(ValidateError::Failed(report)) => report.errors,
        Err(other) => panic!("expected validation failure, got {other}"),
        Ok(output) => panic!("expected validation failure, got output {output}"),
    }
}

#[test]
fn missing_required_property_reports_once() {
    let schema: SchemaNode = object()
        .field("username", string())
        .field("password", string())
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let errors = expect_errors(&validator, json!({ "username": "virk" }));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "password");
    assert_eq!(errors[0].rule, "required");
}

#[test]
fn valid_input_returns_output() {
    let schema: SchemaNode = object()
        .field("username", string())
        .field("password", string())
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let output = validator
        .validate_sync(
            json!({ "username": "virk", "password": "secret" }),
            ValidateOptions::default(),
        )
        .expect("input is valid");

    assert_eq!(output, json!({ "username": "virk", "password": "secret" }));
}

#[test]
fn nested_paths_appear_in_errors() {
    let schema: SchemaNode = object()
        .field(
            "profile",
            object().field("address", object().field("street", string())),
        )
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let errors = expect_errors(&validator, json!({ "profile": { "address": {} } }));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "profile.address.street");
}

#[test]
fn array_element_paths_use_indexes() {
    let schema: SchemaNode = object().field("tags", array(string())).into();
    let validator = compile(&schema, &CompileOptions::default());

    let errors = expect_errors(&validator, json!({ "tags": ["ok", 5] }));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "tags.1");
    assert_eq!(errors[0].rule, "string");
}

#[test]
fn optional_absent_field_is_omitted_from_output() {
    let schema: SchemaNode = object()
        .field("name", string())
        .field("nickname", string().optional())
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let output = validator
        .validate_sync(json!({ "name": "virk" }), ValidateOptions::default())
        .expect("input is valid");

    assert_eq!(output, json!({ "name": "virk" }));
}

#[test]
fn nullable_field_short_circuits_to_null() {
    let schema: SchemaNode = object()
        .field("bio", string().nullable().min_length(10))
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let output = validator
        .validate_sync(json!({ "bio": null }), ValidateOptions::default())
        .expect("null is accepted without running rules");

    assert_eq!(output, json!({ "bio": null }));
}

#[test]
fn root_type_mismatch_reports_on_root_path() {
    let schema: SchemaNode = object().field("name", string()).into();
    let validator = compile(&schema, &CompileOptions::default());

    let errors = expect_errors(&validator, json!(42));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "");
    assert_eq!(errors[0].rule, "object");
}

#[test]
fn camel_case_keys_rename_output_only() {
    let schema: SchemaNode = object()
        .field("first_name", string())
        .field("shipping_address", object().field("zip_code", string()))
        .into();
    let options = CompileOptions {
        camel_case_keys: true,
    };
    let validator = compile(&schema, &options);

    let output = validator
        .validate_sync(
            json!({ "first_name": "virk", "shipping_address": { "zip_code": "110001" } }),
            ValidateOptions::default(),
        )
        .expect("input keys stay snake_case");

    assert_eq!(
        output,
        json!({ "firstName": "virk", "shippingAddress": { "zipCode": "110001" } })
    );
}

#[test]
fn unknown_properties_are_dropped_by_default() {
    let schema: SchemaNode = object().field("name", string()).into();
    let validator = compile(&schema, &CompileOptions::default());

    let output = validator
        .validate_sync(
            json!({ "name": "virk", "extra": true }),
            ValidateOptions::default(),
        )
        .expect("unknown keys are not an error");

    assert_eq!(output, json!({ "name": "virk" }));
}

#[test]
fn unknown_properties_pass_through_when_allowed() {
    let schema: SchemaNode = object()
        .field("name", string())
        .allow_unknown_properties()
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let output = validator
        .validate_sync(
            json!({ "name": "virk", "extra": [1, 2] }),
            ValidateOptions::default(),
        )
        .expect("unknown keys pass through");

    assert_eq!(output, json!({ "name": "virk", "extra": [1, 2] }));
}

#[test]
fn unknown_property_transform_is_applied() {
    let schema: SchemaNode = object()
        .field("name", string())
        .allow_unknown_properties_with(|value| match value {
            Value::String(text) => Value::String(text.to_uppercase()),
            other => other,
        })
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let output = validator
        .validate_sync(
            json!({ "name": "virk", "note": "keep" }),
            ValidateOptions::default(),
        )
        .expect("transform applies to unknown keys only");

    assert_eq!(output, json!({ "name": "virk", "note": "KEEP" }));
}

#[test]
fn empty_string_normalizes_to_null_when_enabled() {
    let schema: SchemaNode = object().field("bio", string().nullable()).into();
    let validator = compile(&schema, &CompileOptions::default()).convert_empty_strings_to_null(true);

    let output = validator
        .validate_sync(json!({ "bio": "" }), ValidateOptions::default())
        .expect("empty string becomes an accepted null");

    assert_eq!(output, json!({ "bio": null }));
}

#[test]
fn normalized_empty_string_fails_non_nullable_field() {
    let schema: SchemaNode = object().field("bio", string()).into();
    let validator = compile(&schema, &CompileOptions::default()).convert_empty_strings_to_null(true);

    let errors = expect_errors(&validator, json!({ "bio": "" }));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "string");
}

#[test]
fn round_trip_without_transforming_rules() {
    let schema: SchemaNode = object()
        .field("name", string().min_length(2))
        .field("age", number().min(0.0))
        .field("tags", array(string()).not_empty())
        .into();
    let validator = compile(&schema, &CompileOptions::default());

    let input = json!({ "name": "virk", "age": 36, "tags": ["a", "b"] });
    let output = validator
        .validate_sync(input.clone(), ValidateOptions::default())
        .expect("input satisfies every rule");

    assert_eq!(output, input);
}
