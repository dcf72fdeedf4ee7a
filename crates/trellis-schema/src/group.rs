use std::fmt;
use std::sync::Arc;

use trellis_core::{
    FieldContext, GroupConditionIr, GroupIr, OtherwiseFn, Predicate, RefEntry, RefsStore,
    predicate_fn,
};

use crate::compile::CompileOptions;
use crate::node::SchemaNode;
use crate::object::{ObjectSchema, compile_properties};

/// Conditional set of object properties merged when a branch matches.
///
/// Branches are evaluated lazily in declaration order; the first match
/// wins. When nothing matches, the `otherwise` handler reports, or the
/// engine falls back to a generic error on the owning object.
#[derive(Clone)]
pub struct ObjectGroup {
    branches: Vec<GroupBranch>,
    otherwise: Option<Arc<OtherwiseFn>>,
}

#[derive(Clone)]
struct GroupBranch {
    predicate: Arc<dyn Predicate>,
    properties: Vec<(String, SchemaNode)>,
}

impl ObjectGroup {
    pub(crate) fn new() -> Self {
        Self {
            branches: Vec::new(),
            otherwise: None,
        }
    }

    /// Add a branch contributing `properties` when `predicate` matches.
    ///
    /// `properties` is used as a property bag; its own flags and groups
    /// are ignored.
    pub fn when(mut self, predicate: Arc<dyn Predicate>, properties: ObjectSchema) -> Self {
        self.branches.push(GroupBranch {
            predicate,
            properties: properties.into_properties(),
        });
        self
    }

    /// Convenience over [`ObjectGroup::when`] for closure predicates.
    pub fn when_fn<F>(self, predicate: F, properties: ObjectSchema) -> Self
    where
        F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.when(predicate_fn(predicate), properties)
    }

    /// Replace the built-in fallback report.
    pub fn otherwise<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut FieldContext<'_>) + Send + Sync + 'static,
    {
        self.otherwise = Some(Arc::new(handler));
        self
    }

    pub(crate) fn compile(&self, refs: &mut RefsStore, options: &CompileOptions) -> GroupIr {
        GroupIr {
            conditions: self
                .branches
                .iter()
                .map(|branch| GroupConditionIr {
                    predicate_ref: refs.track(RefEntry::Predicate(branch.predicate.clone())),
                    properties: compile_properties(&branch.properties, refs, options),
                })
                .collect(),
            otherwise_ref: self
                .otherwise
                .as_ref()
                .map(|handler| refs.track(RefEntry::Otherwise(handler.clone()))),
        }
    }
}

impl fmt::Debug for ObjectGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectGroup")
            .field("branches", &self.branches.len())
            .field("has_otherwise", &self.otherwise.is_some())
            .finish()
    }
}
