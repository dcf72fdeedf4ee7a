//! Schema node model and compile pass for Trellis.
//!
//! Schemas are composed through the builder functions at the crate root
//! (`string()`, `object()`, `union()`, ...), then lowered into the IR and
//! refs store consumed by the engine crate.

mod array;
mod base;
mod compile;
mod group;
mod node;
mod object;
mod record;
pub mod rules;
mod scalars;
mod tuple;
mod union;

use serde_json::Value;

pub use array::ArraySchema;
pub use compile::CompileOptions;
pub use group::ObjectGroup;
pub use node::{DiscriminableSchema, SchemaNode};
pub use object::ObjectSchema;
pub use record::RecordSchema;
pub use scalars::{
    AcceptedSchema, BooleanSchema, DateSchema, EnumSchema, LiteralSchema, NumberSchema,
    StringSchema,
};
pub use tuple::TupleSchema;
pub use union::{UnionSchema, union_of_types};

/// Start a string schema.
pub fn string() -> StringSchema {
    StringSchema::new()
}

/// Start a number schema.
pub fn number() -> NumberSchema {
    NumberSchema::new()
}

/// Start a boolean schema.
pub fn boolean() -> BooleanSchema {
    BooleanSchema::new()
}

/// Start a date schema.
pub fn date() -> DateSchema {
    DateSchema::new()
}

/// Start an enum schema over the given choices.
pub fn enumeration<I, V>(choices: I) -> EnumSchema
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    EnumSchema::new(choices.into_iter().map(Into::into).collect())
}

/// Start a checkbox-acceptance schema.
pub fn accepted() -> AcceptedSchema {
    AcceptedSchema::new()
}

/// Start a schema matching a single literal value.
pub fn literal(expected: impl Into<Value>) -> LiteralSchema {
    LiteralSchema::new(expected.into())
}

/// Start an object schema; declare properties with [`ObjectSchema::field`].
pub fn object() -> ObjectSchema {
    ObjectSchema::new()
}

/// Start an array schema with a uniform element shape.
pub fn array(each: impl Into<SchemaNode>) -> ArraySchema {
    ArraySchema::new(each.into())
}

/// Start a tuple schema; declare members with [`TupleSchema::member`].
pub fn tuple() -> TupleSchema {
    TupleSchema::new()
}

/// Start a record schema with a uniform value shape.
pub fn record(each: impl Into<SchemaNode>) -> RecordSchema {
    RecordSchema::new(each.into())
}

/// Start a predicate-dispatched union schema.
pub fn union() -> UnionSchema {
    UnionSchema::new()
}

/// Start a conditional object property group.
pub fn group() -> ObjectGroup {
    ObjectGroup::new()
}
