use schemars::schema_for;
use trellis_core::IrNode;

fn main() {
    let schema = schema_for!(IrNode);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
