use serde_json::json;
use trellis_core::{IrNode, RefEntry, RefsStore, rule_fn};
use trellis_schema::{CompileOptions, SchemaNode, number, object, string};

fn compile(schema: &SchemaNode) -> (IrNode, RefsStore) {
    let mut refs = RefsStore::new();
    let ir = schema.compile_to_ir(&mut refs, &CompileOptions::default());
    (ir, refs)
}

fn validation_count(ir: &IrNode) -> usize {
    match ir {
        IrNode::Literal(literal) => literal.node.validations.len(),
        other => panic!("expected literal ir, got {other:?}"),
    }
}

#[test]
fn clone_rule_attachment_leaves_original_unchanged() {
    let original = string().min_length(3);
    let extended = original.clone().max_length(5);

    let (original_ir, _) = compile(&original.into());
    let (extended_ir, _) = compile(&extended.into());

    // string type rule + min_length vs. + max_length on the clone only.
    assert_eq!(validation_count(&original_ir), 2);
    assert_eq!(validation_count(&extended_ir), 3);
}

#[test]
fn compiling_twice_yields_independent_refs_stores() {
    let schema: SchemaNode = object()
        .field("name", string().min_length(2))
        .field("age", number())
        .into();

    let (_, mut first) = compile(&schema);
    let (_, second) = compile(&schema);

    assert_eq!(first.len(), second.len());

    // Mutating one store afterwards must not affect the other.
    first.track(RefEntry::Rule {
        rule: rule_fn("extra", |_field, _options| {}),
        options: None,
    });
    assert_eq!(first.len(), second.len() + 1);
}

#[test]
fn every_tracked_ref_resolves() {
    let schema: SchemaNode = object()
        .field("name", string().trim().min_length(2))
        .field("age", number().min(0.0))
        .into();

    let (_, refs) = compile(&schema);

    for id in 0..refs.len() as u32 {
        refs.resolve(trellis_core::RefId(id))
            .expect("compiled ref must resolve");
    }
}

#[test]
fn ir_serializes_with_type_tags() {
    let schema: SchemaNode = object()
        .field("name", string().min_length(2))
        .into();

    let (ir, _) = compile(&schema);
    let json = serde_json::to_value(&ir).expect("ir is plain data");

    assert_eq!(json["type"], json!("object"));
    assert_eq!(json["properties"][0]["field_name"], json!("name"));
    assert_eq!(json["properties"][0]["schema"]["type"], json!("literal"));

    let validations = json["properties"][0]["schema"]["validations"]
        .as_array()
        .expect("leaf carries validations");
    assert_eq!(validations.len(), 2);
    assert_eq!(validations[0]["is_async"], json!(false));
    assert_eq!(validations[0]["implicit"], json!(false));
}

#[test]
fn property_declaration_order_is_preserved() {
    let schema: SchemaNode = object()
        .field("b", string())
        .field("a", string())
        .field("c", string())
        .into();

    let (ir, _) = compile(&schema);
    let IrNode::Object(object_ir) = ir else {
        panic!("expected object ir");
    };

    let names: Vec<&str> = object_ir
        .properties
        .iter()
        .map(|property| property.field_name.as_str())
        .collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn optional_and_nullable_flags_reach_the_ir() {
    let (ir, _) = compile(&string().optional().nullable().into());
    let IrNode::Literal(literal) = ir else {
        panic!("expected literal ir");
    };

    assert!(literal.node.is_optional);
    assert!(literal.node.allow_null);
    assert!(literal.node.bail);
}

#[test]
fn camel_case_option_renames_output_properties() {
    let schema: SchemaNode = object().field("first_name", string()).into();

    let mut refs = RefsStore::new();
    let ir = schema.compile_to_ir(
        &mut refs,
        &CompileOptions {
            camel_case_keys: true,
        },
    );
    let IrNode::Object(object_ir) = ir else {
        panic!("expected object ir");
    };

    assert_eq!(object_ir.properties[0].field_name, "first_name");
    assert_eq!(object_ir.properties[0].property_name, "firstName");
}
