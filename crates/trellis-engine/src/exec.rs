use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};
use trellis_core::{
    ArrayIr, Error, ErrorReporter, FieldContext, FieldPosition, GroupIr, IrNode, MessagesProvider,
    NodeIr, ObjectIr, RecordIr, RefsStore, Result, TupleIr, UnionIr, ValidationIr,
};

const REQUIRED_MESSAGE: &str = "The {{ field }} field must be defined";
const UNION_MESSAGE: &str = "Invalid value provided for the {{ field }} field";
const GROUP_MESSAGE: &str = "The {{ field }} field could not be matched against any condition";

/// Value and address of one field position about to be validated.
///
/// `value: None` means the position was absent from the input, which is
/// distinct from an explicit null.
struct FieldSlot {
    position: FieldPosition,
    value: Option<Value>,
}

/// Outcome of the shared absent/null/rule phase for one node.
enum Gate {
    Done(Option<Value>),
    Continue(Value),
}

/// Interprets a compiled `(IR, refs)` program against one input value.
///
/// The program and bound options are shared read-only across calls; the
/// reporter threaded through the walk is exclusive to one run. Children
/// are visited strictly in declaration order so error ordering stays
/// deterministic.
pub(crate) struct Executor<'r> {
    refs: &'r RefsStore,
    messages: &'r dyn MessagesProvider,
    convert_empty_strings_to_null: bool,
    data: &'r Value,
    meta: &'r Value,
}

impl<'r> Executor<'r> {
    pub fn new(
        refs: &'r RefsStore,
        messages: &'r dyn MessagesProvider,
        convert_empty_strings_to_null: bool,
        data: &'r Value,
        meta: &'r Value,
    ) -> Self {
        Self {
            refs,
            messages,
            convert_empty_strings_to_null,
            data,
            meta,
        }
    }

    /// Walk the whole tree on the asynchronous path.
    pub async fn execute(
        &self,
        ir: &IrNode,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let slot = FieldSlot {
            position: FieldPosition::root(),
            value: Some(self.data.clone()),
        };
        self.walk(ir, slot, reporter).await
    }

    /// Walk the whole tree synchronously, rejecting any async rule or
    /// predicate with a contract error.
    pub fn execute_sync(
        &self,
        ir: &IrNode,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let slot = FieldSlot {
            position: FieldPosition::root(),
            value: Some(self.data.clone()),
        };
        self.walk_sync(ir, slot, reporter)
    }

    fn context<'a>(
        &'a self,
        position: FieldPosition,
        value: Value,
        is_defined: bool,
        reporter: &'a mut dyn ErrorReporter,
    ) -> FieldContext<'a> {
        FieldContext::new(
            position,
            value,
            is_defined,
            self.data,
            self.meta,
            reporter,
            self.messages,
        )
    }

    /// Split an incoming slot value into (value, is_defined), applying
    /// empty-string normalization.
    fn incoming(&self, value: Option<Value>) -> (Value, bool) {
        match value {
            Some(value) => {
                let value = if self.convert_empty_strings_to_null && value.as_str() == Some("") {
                    Value::Null
                } else {
                    value
                };
                (value, true)
            }
            None => (Value::Null, false),
        }
    }

    // ---- synchronous path ----

    fn walk_sync(
        &self,
        node: &IrNode,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        match node {
            IrNode::Literal(ir) => {
                match self.gate_sync(&ir.node, &slot.position, slot.value, reporter)? {
                    Gate::Done(output) => Ok(output),
                    Gate::Continue(value) => Ok(Some(value)),
                }
            }
            IrNode::Object(ir) => self.walk_object_sync(ir, slot, reporter),
            IrNode::Array(ir) => self.walk_array_sync(ir, slot, reporter),
            IrNode::Tuple(ir) => self.walk_tuple_sync(ir, slot, reporter),
            IrNode::Record(ir) => self.walk_record_sync(ir, slot, reporter),
            IrNode::Union(ir) => self.walk_union_sync(ir, slot, reporter),
        }
    }

    /// Shared absent/null handling plus the node's own rule list.
    fn gate_sync(
        &self,
        node: &NodeIr,
        position: &FieldPosition,
        incoming: Option<Value>,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Gate> {
        let (value, is_defined) = self.incoming(incoming);

        if !is_defined {
            let mut ctx = self.context(position.clone(), Value::Null, false, reporter);
            if !node.is_optional {
                ctx.report(REQUIRED_MESSAGE, "required", None);
            }
            self.run_rules_sync(&node.validations, node.bail, &mut ctx)?;
            return Ok(Gate::Done(None));
        }

        if value.is_null() && node.allow_null {
            return Ok(Gate::Done(Some(Value::Null)));
        }

        let mut ctx = self.context(position.clone(), value, true, reporter);
        self.run_rules_sync(&node.validations, node.bail, &mut ctx)?;
        Ok(Gate::Continue(std::mem::take(&mut ctx.value)))
    }

    fn run_rules_sync(
        &self,
        validations: &[ValidationIr],
        bail: bool,
        ctx: &mut FieldContext<'_>,
    ) -> Result<()> {
        for validation in validations {
            if !(ctx.is_defined || validation.implicit) {
                continue;
            }
            if !(ctx.is_valid || !bail) {
                continue;
            }
            let (rule, options) = self.refs.rule(validation.rule_ref)?;
            if validation.is_async {
                return Err(Error::async_rule(rule.name(), ctx.path()));
            }
            rule.check(ctx, options)?;
        }
        Ok(())
    }

    fn walk_object_sync(
        &self,
        ir: &ObjectIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let value = match self.gate_sync(&ir.node, &position, slot.value, reporter)? {
            Gate::Done(output) => return Ok(output),
            Gate::Continue(value) => value,
        };
        let Value::Object(map) = value else {
            return Ok(None);
        };

        let mut out = Map::new();
        for property in &ir.properties {
            let child = FieldSlot {
                position: position.key(&property.field_name),
                value: map.get(&property.field_name).cloned(),
            };
            if let Some(output) = self.walk_sync(&property.schema, child, reporter)? {
                out.insert(property.property_name.clone(), output);
            }
        }

        for group in &ir.groups {
            self.dispatch_group_sync(group, &position, &map, &mut out, reporter)?;
        }

        if ir.allow_unknown_properties {
            self.merge_unknown(ir, &map, &mut out)?;
        }

        Ok(Some(Value::Object(out)))
    }

    fn dispatch_group_sync(
        &self,
        group: &GroupIr,
        position: &FieldPosition,
        map: &Map<String, Value>,
        out: &mut Map<String, Value>,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<()> {
        for condition in &group.conditions {
            let predicate = self.refs.predicate(condition.predicate_ref)?;
            if predicate.is_async() {
                return Err(Error::async_predicate(&position.path));
            }
            let matched = {
                let ctx = self.context(
                    position.clone(),
                    Value::Object(map.clone()),
                    true,
                    reporter,
                );
                predicate.test(&ctx)
            };
            if matched {
                for property in &condition.properties {
                    let child = FieldSlot {
                        position: position.key(&property.field_name),
                        value: map.get(&property.field_name).cloned(),
                    };
                    if let Some(output) = self.walk_sync(&property.schema, child, reporter)? {
                        out.insert(property.property_name.clone(), output);
                    }
                }
                return Ok(());
            }
        }

        let mut ctx = self.context(position.clone(), Value::Object(map.clone()), true, reporter);
        match group.otherwise_ref {
            Some(id) => (self.refs.otherwise(id)?)(&mut ctx),
            None => ctx.report(GROUP_MESSAGE, "group", None),
        }
        Ok(())
    }

    /// Copy undeclared input keys into the output, through the transform
    /// when one is bound.
    fn merge_unknown(
        &self,
        ir: &ObjectIr,
        map: &Map<String, Value>,
        out: &mut Map<String, Value>,
    ) -> Result<()> {
        let mut known: HashSet<&str> = ir
            .properties
            .iter()
            .map(|property| property.field_name.as_str())
            .collect();
        for group in &ir.groups {
            for condition in &group.conditions {
                for property in &condition.properties {
                    known.insert(property.field_name.as_str());
                }
            }
        }

        for (key, item) in map {
            if known.contains(key.as_str()) {
                continue;
            }
            let item = match ir.unknown_transform_ref {
                Some(id) => (self.refs.transform(id)?)(item.clone()),
                None => item.clone(),
            };
            out.insert(key.clone(), item);
        }
        Ok(())
    }

    fn walk_array_sync(
        &self,
        ir: &ArrayIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let value = match self.gate_sync(&ir.node, &position, slot.value, reporter)? {
            Gate::Done(output) => return Ok(output),
            Gate::Continue(value) => value,
        };
        let Value::Array(items) = value else {
            return Ok(None);
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let child = FieldSlot {
                position: position.index(index),
                value: Some(item),
            };
            if let Some(output) = self.walk_sync(&ir.each, child, reporter)? {
                out.push(output);
            }
        }
        Ok(Some(Value::Array(out)))
    }

    fn walk_tuple_sync(
        &self,
        ir: &TupleIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let value = match self.gate_sync(&ir.node, &position, slot.value, reporter)? {
            Gate::Done(output) => return Ok(output),
            Gate::Continue(value) => value,
        };
        let Value::Array(items) = value else {
            return Ok(None);
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, member) in ir.members.iter().enumerate() {
            let child = FieldSlot {
                position: position.index(index),
                value: items.get(index).cloned(),
            };
            if let Some(output) = self.walk_sync(member, child, reporter)? {
                out.push(output);
            }
        }
        if ir.allow_unknown_properties && items.len() > ir.members.len() {
            out.extend(items[ir.members.len()..].iter().cloned());
        }
        Ok(Some(Value::Array(out)))
    }

    fn walk_record_sync(
        &self,
        ir: &RecordIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let value = match self.gate_sync(&ir.node, &position, slot.value, reporter)? {
            Gate::Done(output) => return Ok(output),
            Gate::Continue(value) => value,
        };
        let Value::Object(map) = value else {
            return Ok(None);
        };

        let mut out = Map::new();
        for (key, item) in map {
            let child = FieldSlot {
                position: position.key(&key),
                value: Some(item),
            };
            if let Some(output) = self.walk_sync(&ir.each, child, reporter)? {
                out.insert(key, output);
            }
        }
        Ok(Some(Value::Object(out)))
    }

    fn walk_union_sync(
        &self,
        ir: &UnionIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let (value, is_defined) = self.incoming(slot.value);

        for branch in &ir.conditions {
            let predicate = self.refs.predicate(branch.predicate_ref)?;
            if predicate.is_async() {
                return Err(Error::async_predicate(&position.path));
            }
            let matched = {
                let ctx = self.context(position.clone(), value.clone(), is_defined, reporter);
                predicate.test(&ctx)
            };
            if matched {
                let child = FieldSlot {
                    position,
                    value: is_defined.then_some(value),
                };
                return self.walk_sync(&branch.schema, child, reporter);
            }
        }

        let mut ctx = self.context(position, value, is_defined, reporter);
        match ir.otherwise_ref {
            Some(id) => (self.refs.otherwise(id)?)(&mut ctx),
            None => ctx.report(UNION_MESSAGE, "union", None),
        }
        Ok(None)
    }

    // ---- asynchronous path ----
    //
    // Mirrors the synchronous walk, awaiting each rule and predicate in
    // declaration order. Recursion is boxed; no parallelism is introduced
    // anywhere so error ordering matches the sync path exactly.

    fn walk<'a>(
        &'a self,
        node: &'a IrNode,
        slot: FieldSlot,
        reporter: &'a mut dyn ErrorReporter,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            match node {
                IrNode::Literal(ir) => {
                    match self
                        .gate(&ir.node, &slot.position, slot.value, reporter)
                        .await?
                    {
                        Gate::Done(output) => Ok(output),
                        Gate::Continue(value) => Ok(Some(value)),
                    }
                }
                IrNode::Object(ir) => self.walk_object(ir, slot, reporter).await,
                IrNode::Array(ir) => self.walk_array(ir, slot, reporter).await,
                IrNode::Tuple(ir) => self.walk_tuple(ir, slot, reporter).await,
                IrNode::Record(ir) => self.walk_record(ir, slot, reporter).await,
                IrNode::Union(ir) => self.walk_union(ir, slot, reporter).await,
            }
        })
    }

    async fn gate(
        &self,
        node: &NodeIr,
        position: &FieldPosition,
        incoming: Option<Value>,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Gate> {
        let (value, is_defined) = self.incoming(incoming);

        if !is_defined {
            let mut ctx = self.context(position.clone(), Value::Null, false, reporter);
            if !node.is_optional {
                ctx.report(REQUIRED_MESSAGE, "required", None);
            }
            self.run_rules(&node.validations, node.bail, &mut ctx).await?;
            return Ok(Gate::Done(None));
        }

        if value.is_null() && node.allow_null {
            return Ok(Gate::Done(Some(Value::Null)));
        }

        let mut ctx = self.context(position.clone(), value, true, reporter);
        self.run_rules(&node.validations, node.bail, &mut ctx).await?;
        Ok(Gate::Continue(std::mem::take(&mut ctx.value)))
    }

    async fn run_rules(
        &self,
        validations: &[ValidationIr],
        bail: bool,
        ctx: &mut FieldContext<'_>,
    ) -> Result<()> {
        for validation in validations {
            if !(ctx.is_defined || validation.implicit) {
                continue;
            }
            if !(ctx.is_valid || !bail) {
                continue;
            }
            let (rule, options) = self.refs.rule(validation.rule_ref)?;
            rule.check_async(ctx, options).await?;
        }
        Ok(())
    }

    async fn walk_object(
        &self,
        ir: &ObjectIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let value = match self.gate(&ir.node, &position, slot.value, reporter).await? {
            Gate::Done(output) => return Ok(output),
            Gate::Continue(value) => value,
        };
        let Value::Object(map) = value else {
            return Ok(None);
        };

        let mut out = Map::new();
        for property in &ir.properties {
            let child = FieldSlot {
                position: position.key(&property.field_name),
                value: map.get(&property.field_name).cloned(),
            };
            if let Some(output) = self.walk(&property.schema, child, &mut *reporter).await? {
                out.insert(property.property_name.clone(), output);
            }
        }

        for group in &ir.groups {
            self.dispatch_group(group, &position, &map, &mut out, &mut *reporter)
                .await?;
        }

        if ir.allow_unknown_properties {
            self.merge_unknown(ir, &map, &mut out)?;
        }

        Ok(Some(Value::Object(out)))
    }

    async fn dispatch_group(
        &self,
        group: &GroupIr,
        position: &FieldPosition,
        map: &Map<String, Value>,
        out: &mut Map<String, Value>,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<()> {
        for condition in &group.conditions {
            let predicate = self.refs.predicate(condition.predicate_ref)?;
            let matched = {
                let ctx = self.context(
                    position.clone(),
                    Value::Object(map.clone()),
                    true,
                    &mut *reporter,
                );
                predicate.test_async(&ctx).await
            };
            if matched {
                for property in &condition.properties {
                    let child = FieldSlot {
                        position: position.key(&property.field_name),
                        value: map.get(&property.field_name).cloned(),
                    };
                    if let Some(output) = self.walk(&property.schema, child, &mut *reporter).await?
                    {
                        out.insert(property.property_name.clone(), output);
                    }
                }
                return Ok(());
            }
        }

        let mut ctx = self.context(position.clone(), Value::Object(map.clone()), true, reporter);
        match group.otherwise_ref {
            Some(id) => (self.refs.otherwise(id)?)(&mut ctx),
            None => ctx.report(GROUP_MESSAGE, "group", None),
        }
        Ok(())
    }

    async fn walk_array(
        &self,
        ir: &ArrayIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let value = match self.gate(&ir.node, &position, slot.value, reporter).await? {
            Gate::Done(output) => return Ok(output),
            Gate::Continue(value) => value,
        };
        let Value::Array(items) = value else {
            return Ok(None);
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let child = FieldSlot {
                position: position.index(index),
                value: Some(item),
            };
            if let Some(output) = self.walk(&ir.each, child, &mut *reporter).await? {
                out.push(output);
            }
        }
        Ok(Some(Value::Array(out)))
    }

    async fn walk_tuple(
        &self,
        ir: &TupleIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let value = match self.gate(&ir.node, &position, slot.value, reporter).await? {
            Gate::Done(output) => return Ok(output),
            Gate::Continue(value) => value,
        };
        let Value::Array(items) = value else {
            return Ok(None);
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, member) in ir.members.iter().enumerate() {
            let child = FieldSlot {
                position: position.index(index),
                value: items.get(index).cloned(),
            };
            if let Some(output) = self.walk(member, child, &mut *reporter).await? {
                out.push(output);
            }
        }
        if ir.allow_unknown_properties && items.len() > ir.members.len() {
            out.extend(items[ir.members.len()..].iter().cloned());
        }
        Ok(Some(Value::Array(out)))
    }

    async fn walk_record(
        &self,
        ir: &RecordIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let value = match self.gate(&ir.node, &position, slot.value, reporter).await? {
            Gate::Done(output) => return Ok(output),
            Gate::Continue(value) => value,
        };
        let Value::Object(map) = value else {
            return Ok(None);
        };

        let mut out = Map::new();
        for (key, item) in map {
            let child = FieldSlot {
                position: position.key(&key),
                value: Some(item),
            };
            if let Some(output) = self.walk(&ir.each, child, &mut *reporter).await? {
                out.insert(key, output);
            }
        }
        Ok(Some(Value::Object(out)))
    }

    async fn walk_union(
        &self,
        ir: &UnionIr,
        slot: FieldSlot,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Option<Value>> {
        let position = slot.position;
        let (value, is_defined) = self.incoming(slot.value);

        for branch in &ir.conditions {
            let predicate = self.refs.predicate(branch.predicate_ref)?;
            let matched = {
                let ctx = self.context(
                    position.clone(),
                    value.clone(),
                    is_defined,
                    &mut *reporter,
                );
                predicate.test_async(&ctx).await
            };
            if matched {
                let child = FieldSlot {
                    position,
                    value: is_defined.then_some(value),
                };
                return self.walk(&branch.schema, child, reporter).await;
            }
        }

        let mut ctx = self.context(position, value, is_defined, reporter);
        match ir.otherwise_ref {
            Some(id) => (self.refs.otherwise(id)?)(&mut ctx),
            None => ctx.report(UNION_MESSAGE, "union", None),
        }
        Ok(None)
    }
}
