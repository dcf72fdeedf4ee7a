use trellis_core::{IrNode, RefsStore};

use crate::array::ArraySchema;
use crate::compile::CompileOptions;
use crate::object::ObjectSchema;
use crate::record::RecordSchema;
use crate::scalars::{
    AcceptedSchema, BooleanSchema, DateSchema, EnumSchema, LiteralSchema, NumberSchema,
    StringSchema,
};
use crate::tuple::TupleSchema;
use crate::union::UnionSchema;

/// A declarative description of the expected shape for one value.
///
/// The scalar kinds of the model are flattened into dedicated variants;
/// conditional groups are an object attachment rather than a field node.
/// Nodes are plain data and clone into fully independent copies: attaching
/// rules to a clone never mutates the original.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Date(DateSchema),
    Enum(EnumSchema),
    Accepted(AcceptedSchema),
    Literal(LiteralSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    Tuple(TupleSchema),
    Record(RecordSchema),
    Union(UnionSchema),
}

impl SchemaNode {
    /// Lower this node and its children into IR, registering runtime
    /// callbacks in `refs`.
    ///
    /// Called exactly once per node per compile invocation; apart from
    /// tracking callbacks, the pass is referentially transparent.
    pub fn compile_to_ir(&self, refs: &mut RefsStore, options: &CompileOptions) -> IrNode {
        match self {
            SchemaNode::String(schema) => schema.compile(refs, options),
            SchemaNode::Number(schema) => schema.compile(refs, options),
            SchemaNode::Boolean(schema) => schema.compile(refs, options),
            SchemaNode::Date(schema) => schema.compile(refs, options),
            SchemaNode::Enum(schema) => schema.compile(refs, options),
            SchemaNode::Accepted(schema) => schema.compile(refs, options),
            SchemaNode::Literal(schema) => schema.compile(refs, options),
            SchemaNode::Object(schema) => schema.compile(refs, options),
            SchemaNode::Array(schema) => schema.compile(refs, options),
            SchemaNode::Tuple(schema) => schema.compile(refs, options),
            SchemaNode::Record(schema) => schema.compile(refs, options),
            SchemaNode::Union(schema) => schema.compile(refs, options),
        }
    }

    /// Discriminator for type-distinguished unions; `None` when this node
    /// kind cannot join one.
    pub fn discriminator(&self) -> Option<&'static str> {
        match self {
            SchemaNode::String(schema) => Some(schema.discriminator()),
            SchemaNode::Number(schema) => Some(schema.discriminator()),
            SchemaNode::Boolean(schema) => Some(schema.discriminator()),
            SchemaNode::Object(schema) => Some(schema.discriminator()),
            SchemaNode::Array(schema) => Some(schema.discriminator()),
            SchemaNode::Tuple(schema) => Some(schema.discriminator()),
            SchemaNode::Record(schema) => Some(schema.discriminator()),
            _ => None,
        }
    }

    /// Human name of the node kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::String(_) => "string",
            SchemaNode::Number(_) => "number",
            SchemaNode::Boolean(_) => "boolean",
            SchemaNode::Date(_) => "date",
            SchemaNode::Enum(_) => "enum",
            SchemaNode::Accepted(_) => "accepted",
            SchemaNode::Literal(_) => "literal",
            SchemaNode::Object(_) => "object",
            SchemaNode::Array(_) => "array",
            SchemaNode::Tuple(_) => "tuple",
            SchemaNode::Record(_) => "record",
            SchemaNode::Union(_) => "union",
        }
    }
}

/// Capability a schema must expose to join a type-distinguished union.
///
/// The discriminator names the runtime type the schema expects; unions
/// reject duplicates at construction time.
pub trait DiscriminableSchema {
    fn discriminator(&self) -> &'static str;
}

impl DiscriminableSchema for StringSchema {
    fn discriminator(&self) -> &'static str {
        "string"
    }
}

impl DiscriminableSchema for NumberSchema {
    fn discriminator(&self) -> &'static str {
        "number"
    }
}

impl DiscriminableSchema for BooleanSchema {
    fn discriminator(&self) -> &'static str {
        "boolean"
    }
}

impl DiscriminableSchema for ObjectSchema {
    fn discriminator(&self) -> &'static str {
        "object"
    }
}

impl DiscriminableSchema for ArraySchema {
    fn discriminator(&self) -> &'static str {
        "array"
    }
}

impl DiscriminableSchema for TupleSchema {
    fn discriminator(&self) -> &'static str {
        "tuple"
    }
}

impl DiscriminableSchema for RecordSchema {
    fn discriminator(&self) -> &'static str {
        "record"
    }
}

impl From<StringSchema> for SchemaNode {
    fn from(schema: StringSchema) -> Self {
        SchemaNode::String(schema)
    }
}

impl From<NumberSchema> for SchemaNode {
    fn from(schema: NumberSchema) -> Self {
        SchemaNode::Number(schema)
    }
}

impl From<BooleanSchema> for SchemaNode {
    fn from(schema: BooleanSchema) -> Self {
        SchemaNode::Boolean(schema)
    }
}

impl From<DateSchema> for SchemaNode {
    fn from(schema: DateSchema) -> Self {
        SchemaNode::Date(schema)
    }
}

impl From<EnumSchema> for SchemaNode {
    fn from(schema: EnumSchema) -> Self {
        SchemaNode::Enum(schema)
    }
}

impl From<AcceptedSchema> for SchemaNode {
    fn from(schema: AcceptedSchema) -> Self {
        SchemaNode::Accepted(schema)
    }
}

impl From<LiteralSchema> for SchemaNode {
    fn from(schema: LiteralSchema) -> Self {
        SchemaNode::Literal(schema)
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(schema: ObjectSchema) -> Self {
        SchemaNode::Object(schema)
    }
}

impl From<ArraySchema> for SchemaNode {
    fn from(schema: ArraySchema) -> Self {
        SchemaNode::Array(schema)
    }
}

impl From<TupleSchema> for SchemaNode {
    fn from(schema: TupleSchema) -> Self {
        SchemaNode::Tuple(schema)
    }
}

impl From<RecordSchema> for SchemaNode {
    fn from(schema: RecordSchema) -> Self {
        SchemaNode::Record(schema)
    }
}

impl From<UnionSchema> for SchemaNode {
    fn from(schema: UnionSchema) -> Self {
        SchemaNode::Union(schema)
    }
}
