//! A single scope of the scope tree.
//!
//! Lookups go through three tiers, closest first: block parameters, then
//! either members of the current value or the inherited context data. Block
//! parameters shadow both, matching nested-block semantics.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use gabarit_carton::{
    CapacityError, CascadeIndex, CompactString, DeferredValue, EntryIndex, FixedSizeMap,
    StrComparer,
};

use crate::config::{ScopeConfig, EXTENSIONS_LAYOUT};
use crate::object::ObjectDescriptor;
use crate::segment::{ChainSegment, SegmentComparer, WellKnownVariable};
use crate::value::{HashParameters, Value};

use super::tree::ScopeTree;

/// Compiled template fragment, rendered against a scope of a tree
pub type Template = Rc<dyn Fn(&mut ScopeTree, ContextId, &mut String)>;

/// Segment-keyed bindings of a scope
pub type DataMap = FixedSizeMap<ChainSegment, Value, SegmentComparer>;

/// Inline partials visible from a scope
pub type PartialRegistry = CascadeIndex<CompactString, Template, StrComparer>;

type DescriptorProducer = fn(&ScopeContext) -> Option<ObjectDescriptor>;

/// Identifier of a scope within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ContextId(u32);

impl ContextId {
    /// The tree root
    pub const ROOT: Self = Self(0);

    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of the scope tree
pub struct ScopeContext {
    id: ContextId,
    parent: Option<ContextId>,
    root: ContextId,
    depth: u32,
    value: Value,
    template_path: Option<CompactString>,
    partial_block_template: Option<Template>,
    block_params: DataMap,
    root_data: DataMap,
    context_data: DataMap,
    extensions: FixedSizeMap<CompactString, Value, StrComparer>,
    inline_partials: PartialRegistry,
    descriptor: DeferredValue<ScopeContext, Option<ObjectDescriptor>>,
    well_known: [Option<EntryIndex>; WellKnownVariable::COUNT],
    config: Arc<ScopeConfig>,
}

fn describe_value(context: &ScopeContext) -> Option<ObjectDescriptor> {
    ObjectDescriptor::create(&context.value, &context.config)
}

impl ScopeContext {
    pub(super) fn new(
        id: ContextId,
        config: Arc<ScopeConfig>,
        value: Value,
        parent: Option<ContextId>,
        template_path: Option<CompactString>,
        partial_block_template: Option<Template>,
        inline_partials: PartialRegistry,
    ) -> Self {
        let layout = config.options().data_layout;
        let comparer = SegmentComparer::new(config.options().data_case);
        let block_params = DataMap::new(layout, comparer);
        let context_data = DataMap::new(layout, comparer);

        // Well-known slots taken from context data are read back from block
        // parameters, which is only sound when both share a layout.
        assert_eq!(
            block_params.layout(),
            context_data.layout(),
            "block parameters and context data must share a layout"
        );

        Self {
            id,
            parent,
            root: id,
            depth: 0,
            value,
            template_path,
            partial_block_template,
            block_params,
            root_data: DataMap::new(layout, comparer),
            context_data,
            extensions: FixedSizeMap::new(EXTENSIONS_LAYOUT, StrComparer::ignore_case()),
            inline_partials,
            descriptor: DeferredValue::new(describe_value as DescriptorProducer),
            well_known: [None; WellKnownVariable::COUNT],
            config,
        }
    }

    /// Wire root, parent and inherited bindings. `contexts` holds every
    /// scope created before this one, the parent included.
    pub(super) fn initialize(&mut self, contexts: &[ScopeContext]) {
        let parent = self.parent.map(|id| &contexts[id.index()]);
        let root = parent.map(|parent| &contexts[parent.root.index()]);
        self.root = parent.map_or(self.id, |parent| parent.root);
        self.depth = parent.map_or(0, |parent| parent.depth + 1);

        if let Some(root) = root {
            root.root_data.copy_to(&mut self.context_data);
        }

        let root_value = root.map_or_else(|| self.value.clone(), |root| root.value.clone());
        self.set_well_known(WellKnownVariable::Root, root_value);

        let Some(parent) = parent else {
            self.set_well_known(
                WellKnownVariable::Parent,
                Value::undefined(WellKnownVariable::Parent.name()),
            );
            return;
        };

        self.set_well_known(WellKnownVariable::Parent, parent.value.clone());
        parent.block_params.copy_to(&mut self.block_params);

        if self.template_path.is_none() {
            self.template_path = parent.template_path.clone();
        }

        if let Value::Hash(hash) = &self.value {
            if !parent.value.is_null() && !self.value.ptr_eq(&parent.value) {
                populate_hash(hash, &parent.value, &self.config);
            }
        }
    }

    #[inline]
    pub fn id(&self) -> ContextId {
        self.id
    }

    #[inline]
    pub fn parent_id(&self) -> Option<ContextId> {
        self.parent
    }

    #[inline]
    pub fn root_id(&self) -> ContextId {
        self.root
    }

    /// Distance from the root
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Subject value expressions are evaluated against
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the subject value.
    ///
    /// The member descriptor is not recomputed once it has been produced.
    #[inline]
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    #[inline]
    pub fn template_path(&self) -> Option<&str> {
        self.template_path.as_deref()
    }

    /// Template rendered by `{{> @partial-block}}`
    #[inline]
    pub fn partial_block_template(&self) -> Option<&Template> {
        self.partial_block_template.as_ref()
    }

    #[inline]
    pub fn block_params(&self) -> &DataMap {
        &self.block_params
    }

    #[inline]
    pub fn root_data(&self) -> &DataMap {
        &self.root_data
    }

    #[inline]
    pub fn context_data(&self) -> &DataMap {
        &self.context_data
    }

    #[inline]
    pub fn inline_partials(&self) -> &PartialRegistry {
        &self.inline_partials
    }

    #[inline]
    pub fn config(&self) -> &Arc<ScopeConfig> {
        &self.config
    }

    /// Member-access capability for the value, produced on first use
    #[inline]
    pub fn member_descriptor(&self) -> Option<&ObjectDescriptor> {
        self.descriptor.get(self).as_ref()
    }

    /// Context-data slot recorded for a well-known variable
    #[inline]
    pub fn well_known_index(&self, variable: WellKnownVariable) -> Option<EntryIndex> {
        self.well_known[variable.index()]
    }

    /// Resolve `segment` for a plain `{{name}}` lookup.
    ///
    /// Block parameters first, then members of the value. A segment written
    /// as `@name` consults the data bindings before the value.
    pub fn resolve_against_value(&self, segment: &ChainSegment) -> Option<Value> {
        if segment.is_data_reference() {
            if let Some(value) = self.resolve_against_data(segment) {
                return Some(value);
            }
        }

        match segment.well_known() {
            Some(variable) => self
                .block_param_at(variable)
                .or_else(|| self.member(segment)),
            None => self
                .block_params
                .try_get(segment)
                .cloned()
                .or_else(|| self.member(segment)),
        }
    }

    /// Resolve `segment` for an `{{@name}}` data lookup.
    ///
    /// Block parameters first, then context data.
    pub fn resolve_against_data(&self, segment: &ChainSegment) -> Option<Value> {
        if let Some(value) = self.block_params.try_get(segment) {
            return Some(value.clone());
        }

        match segment.well_known() {
            Some(variable) => self
                .well_known_index(variable)
                .and_then(|index| self.context_data.try_get_at(index))
                .cloned(),
            None => self.context_data.try_get(segment).cloned(),
        }
    }

    /// Resolve one segment of a compiled path
    #[inline]
    pub fn resolve(&self, segment: &ChainSegment) -> Option<Value> {
        if segment.is_data_reference() {
            self.resolve_against_data(segment)
        } else {
            self.resolve_against_value(segment)
        }
    }

    fn block_param_at(&self, variable: WellKnownVariable) -> Option<Value> {
        self.well_known_index(variable)
            .and_then(|index| self.block_params.try_get_at(index))
            .cloned()
    }

    fn member(&self, segment: &ChainSegment) -> Option<Value> {
        self.member_descriptor()?
            .try_get_member(&self.value, segment)
    }

    /// Bind a block parameter visible to this scope and scopes created from it
    pub fn set_block_param(&mut self, segment: ChainSegment, value: Value) -> EntryIndex {
        self.block_params.add_or_replace(segment, value)
    }

    /// Bind a context-data entry; well-known segments record their slot
    pub fn set_data(&mut self, segment: ChainSegment, value: Value) -> EntryIndex {
        let variable = segment.well_known();
        let index = self.context_data.add_or_replace(segment, value);
        if let Some(variable) = variable {
            self.well_known[variable.index()] = Some(index);
        }
        index
    }

    /// Bind a well-known variable in context data
    pub fn set_well_known(&mut self, variable: WellKnownVariable, value: Value) -> EntryIndex {
        self.set_data(ChainSegment::well_known_segment(variable), value)
    }

    /// Register every member of `data` as root data of this scope.
    ///
    /// Meant for the tree root before any child exists: children copy root
    /// data once, when they are created. Data is host input, so running out
    /// of slots is reported rather than fatal; members registered before the
    /// failing one stay bound.
    pub fn set_data_object(&mut self, data: Option<&Value>) -> Result<(), CapacityError> {
        let Some(data) = data else {
            return Ok(());
        };
        let Some(descriptor) = ObjectDescriptor::create(data, &self.config) else {
            tracing::debug!(kind = data.type_name(), "data object has no members");
            return Ok(());
        };

        let mut count = 0usize;
        for segment in descriptor.properties(data) {
            let Some(value) = descriptor.try_get_member(data, &segment) else {
                continue;
            };
            self.root_data
                .try_add_or_replace(segment.clone(), value.clone())?;
            self.context_data.try_add_or_replace(segment, value)?;
            count += 1;
        }

        tracing::debug!(scope = %self.id, count, "registered data object");
        Ok(())
    }

    /// Register an inline partial for this scope's subtree
    pub fn register_inline_partial(&self, name: &str, template: Template) {
        self.inline_partials
            .register(CompactString::new(name), template);
    }

    /// Nearest inline partial named `name`
    pub fn inline_partial(&self, name: &str) -> Option<Template> {
        self.inline_partials.lookup(&CompactString::new(name))
    }

    /// Store helper-private state on this scope
    pub fn set_extension(&mut self, name: &str, value: Value) {
        self.extensions
            .add_or_replace(CompactString::new(name), value);
    }

    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.try_get(&CompactString::new(name))
    }
}

/// Copy members of `from` into `hash` for every name the hash lacks.
/// Arguments passed explicitly always win over inherited ones.
fn populate_hash(hash: &HashParameters, from: &Value, config: &ScopeConfig) {
    let Some(descriptor) = ObjectDescriptor::create(from, config) else {
        return;
    };

    let mut inherited = 0usize;
    for segment in descriptor.properties(from) {
        if hash.contains_key(&segment) {
            continue;
        }
        let Some(value) = descriptor.try_get_member(from, &segment) else {
            continue;
        };
        hash.insert(segment, value);
        inherited += 1;
    }

    tracing::trace!(inherited, "populated hash arguments from parent value");
}

impl fmt::Debug for ScopeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeContext")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("root", &self.root)
            .field("value", &self.value)
            .field("template_path", &self.template_path)
            .field("block_params", &self.block_params)
            .field("context_data", &self.context_data)
            .field("inline_partials", &self.inline_partials)
            .finish_non_exhaustive()
    }
}
