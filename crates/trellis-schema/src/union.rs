use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use trellis_core::{
    Error, FieldContext, IrNode, OtherwiseFn, Predicate, RefEntry, RefsStore, Result,
    UnionBranchIr, UnionIr, predicate_fn,
};

use crate::compile::CompileOptions;
use crate::node::SchemaNode;

/// Ordered branch selection over full schema nodes.
///
/// Predicates are evaluated lazily in declaration order; the first match
/// wins and its schema validates the field with normal composite
/// semantics. When nothing matches, the `otherwise` handler reports, or
/// the engine falls back to a generic error.
#[derive(Clone)]
pub struct UnionSchema {
    branches: Vec<(Arc<dyn Predicate>, SchemaNode)>,
    otherwise: Option<Arc<OtherwiseFn>>,
}

impl UnionSchema {
    pub(crate) fn new() -> Self {
        Self {
            branches: Vec::new(),
            otherwise: None,
        }
    }

    /// Add a branch claiming the field when `predicate` matches.
    pub fn when(mut self, predicate: Arc<dyn Predicate>, schema: impl Into<SchemaNode>) -> Self {
        self.branches.push((predicate, schema.into()));
        self
    }

    /// Convenience over [`UnionSchema::when`] for closure predicates.
    pub fn when_fn<F>(self, predicate: F, schema: impl Into<SchemaNode>) -> Self
    where
        F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.when(predicate_fn(predicate), schema)
    }

    /// Replace the built-in fallback report.
    pub fn otherwise<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut FieldContext<'_>) + Send + Sync + 'static,
    {
        self.otherwise = Some(Arc::new(handler));
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, options: &CompileOptions) -> IrNode {
        IrNode::Union(UnionIr {
            conditions: self
                .branches
                .iter()
                .map(|(predicate, schema)| UnionBranchIr {
                    predicate_ref: refs.track(RefEntry::Predicate(predicate.clone())),
                    schema: schema.compile_to_ir(refs, options),
                })
                .collect(),
            otherwise_ref: self
                .otherwise
                .as_ref()
                .map(|handler| refs.track(RefEntry::Otherwise(handler.clone()))),
        })
    }
}

impl fmt::Debug for UnionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionSchema")
            .field("branches", &self.branches.len())
            .field("has_otherwise", &self.otherwise.is_some())
            .finish()
    }
}

/// Build a union dispatching on the runtime type of the value.
///
/// Every member must expose a discriminator (see
/// [`crate::DiscriminableSchema`]); duplicate discriminators and
/// non-discriminable nodes are rejected eagerly.
pub fn union_of_types(members: Vec<SchemaNode>) -> Result<UnionSchema> {
    let mut seen = HashSet::new();
    let mut union = UnionSchema::new();

    for member in members {
        let Some(kind) = member.discriminator() else {
            return Err(Error::InvalidSchema(format!(
                "a {} schema cannot join a type-distinguished union",
                member.kind_name()
            )));
        };
        if !seen.insert(kind) {
            return Err(Error::InvalidSchema(format!(
                "duplicate union type '{kind}'"
            )));
        }
        union = union.when(Arc::new(TypePredicate { kind }), member);
    }

    Ok(union)
}

/// Predicate matching on the JSON type of the value.
struct TypePredicate {
    kind: &'static str,
}

impl Predicate for TypePredicate {
    fn test(&self, field: &FieldContext<'_>) -> bool {
        match self.kind {
            "string" => field.value.is_string(),
            "number" => field.value.is_number(),
            "boolean" => field.value.is_boolean(),
            "object" | "record" => field.value.is_object(),
            "array" | "tuple" => field.value.is_array(),
            _ => false,
        }
    }
}
