use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use trellis_core::{IrNode, ObjectIr, PropertyIr, RefEntry, RefsStore, Rule, RuleUse, TransformFn};

use crate::base::NodeBase;
use crate::compile::{CompileOptions, camel_case};
use crate::group::ObjectGroup;
use crate::node::SchemaNode;
use crate::rules::ObjectRule;

/// Schema for objects with declared properties.
#[derive(Clone)]
pub struct ObjectSchema {
    base: NodeBase,
    properties: Vec<(String, SchemaNode)>,
    groups: Vec<ObjectGroup>,
    allow_unknown: bool,
    unknown_transform: Option<Arc<TransformFn>>,
}

impl ObjectSchema {
    pub(crate) fn new() -> Self {
        Self {
            base: NodeBase::new(),
            properties: Vec::new(),
            groups: Vec::new(),
            allow_unknown: false,
            unknown_transform: None,
        }
    }

    /// Declare a property. Declaration order is validation order.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<SchemaNode>) -> Self {
        self.properties.push((name.into(), schema.into()));
        self
    }

    /// Accept absent values and omit them from the output.
    pub fn optional(mut self) -> Self {
        self.base.is_optional = true;
        self
    }

    /// Accept null and produce a null output without running rules.
    pub fn nullable(mut self) -> Self {
        self.base.allow_null = true;
        self
    }

    /// Toggle per-field short-circuiting (enabled by default).
    pub fn bail(mut self, bail: bool) -> Self {
        self.base.bail = bail;
        self
    }

    /// Attach a custom rule with optional JSON options.
    pub fn use_rule(mut self, rule: Arc<dyn Rule>, options: Option<Value>) -> Self {
        self.base.push(rule, options);
        self
    }

    /// Copy undeclared input keys into the output unchanged.
    pub fn allow_unknown_properties(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    /// Copy undeclared input keys into the output through a transform.
    pub fn allow_unknown_properties_with<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.allow_unknown = true;
        self.unknown_transform = Some(Arc::new(transform));
        self
    }

    /// Merge a conditional property group into this object.
    pub fn merge_group(mut self, group: ObjectGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub(crate) fn into_properties(self) -> Vec<(String, SchemaNode)> {
        self.properties
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, options: &CompileOptions) -> IrNode {
        let leading = RuleUse::new(Arc::new(ObjectRule));
        let node = self.base.compile(Some(leading), refs);
        let properties = compile_properties(&self.properties, refs, options);
        let groups = self
            .groups
            .iter()
            .map(|group| group.compile(refs, options))
            .collect();
        let unknown_transform_ref = self
            .unknown_transform
            .as_ref()
            .map(|transform| refs.track(RefEntry::Transform(transform.clone())));

        IrNode::Object(ObjectIr {
            node,
            properties,
            groups,
            allow_unknown_properties: self.allow_unknown,
            unknown_transform_ref,
        })
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("base", &self.base)
            .field("properties", &self.properties)
            .field("groups", &self.groups.len())
            .field("allow_unknown", &self.allow_unknown)
            .finish()
    }
}

/// Compile a declared property list, applying camelCase renaming to the
/// output names when enabled.
pub(crate) fn compile_properties(
    properties: &[(String, SchemaNode)],
    refs: &mut RefsStore,
    options: &CompileOptions,
) -> Vec<PropertyIr> {
    properties
        .iter()
        .map(|(name, schema)| PropertyIr {
            field_name: name.clone(),
            property_name: if options.camel_case_keys {
                camel_case(name)
            } else {
                name.clone()
            },
            schema: schema.compile_to_ir(refs, options),
        })
        .collect()
}
