use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifier of a runtime callback tracked in the refs store.
///
/// Ids are assigned once per compile call and are never reused across
/// different callbacks within the same compiled schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RefId(pub u32);

impl std::fmt::Display for RefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ref://{}", self.0)
    }
}

/// Compiled form of a schema node tree.
///
/// The IR is pure data; every runtime callback it needs is referenced by
/// [`RefId`] into the refs store produced by the same compile call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IrNode {
    Literal(LiteralIr),
    Object(ObjectIr),
    Array(ArrayIr),
    Tuple(TupleIr),
    Record(RecordIr),
    Union(UnionIr),
}

/// Flags and compiled rule list shared by every node variant.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NodeIr {
    /// Absent values are accepted and omitted from the output.
    pub is_optional: bool,
    /// Null values are accepted and short-circuit to a null output.
    pub allow_null: bool,
    /// Stop running rules on this field after its first failure.
    pub bail: bool,
    /// Rules in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationIr>,
}

/// A single compiled rule position.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidationIr {
    /// Ref of the rule callback and its bound options.
    pub rule_ref: RefId,
    /// Implicit rules run even when the field is absent.
    pub implicit: bool,
    /// Declared dispatch mode; checked by the synchronous path.
    pub is_async: bool,
}

/// Leaf value with attached validations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LiteralIr {
    #[serde(flatten)]
    pub node: NodeIr,
}

/// Declared object property with its output name and compiled schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PropertyIr {
    /// Key expected in the input object.
    pub field_name: String,
    /// Key written to the output object (camelCased when enabled).
    pub property_name: String,
    pub schema: IrNode,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ObjectIr {
    #[serde(flatten)]
    pub node: NodeIr,
    pub properties: Vec<PropertyIr>,
    /// Conditional property groups merged after declared properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupIr>,
    /// Copy undeclared input keys into the output.
    pub allow_unknown_properties: bool,
    /// Transform applied to each unknown property before merging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_transform_ref: Option<RefId>,
}

/// Object-level conditional merge: ordered branches plus a fallback.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GroupIr {
    pub conditions: Vec<GroupConditionIr>,
    /// Fallback invoked when no branch matches. `None` means the engine
    /// reports the built-in generic error, so the fallback is mandatory in
    /// behavior even when the schema supplies none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise_ref: Option<RefId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GroupConditionIr {
    pub predicate_ref: RefId,
    /// Properties contributed to the owning object when the branch wins.
    pub properties: Vec<PropertyIr>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArrayIr {
    #[serde(flatten)]
    pub node: NodeIr,
    /// Schema applied to every element.
    pub each: Box<IrNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TupleIr {
    #[serde(flatten)]
    pub node: NodeIr,
    /// Positional member schemas.
    pub members: Vec<IrNode>,
    /// Pass elements beyond the declared members through unchanged.
    pub allow_unknown_properties: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecordIr {
    #[serde(flatten)]
    pub node: NodeIr,
    /// Schema applied to every value; keys are preserved verbatim.
    pub each: Box<IrNode>,
}

/// Ordered branch selection over full schema nodes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnionIr {
    pub conditions: Vec<UnionBranchIr>,
    /// Fallback ref; `None` selects the built-in generic report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise_ref: Option<RefId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnionBranchIr {
    pub predicate_ref: RefId,
    pub schema: IrNode,
}
