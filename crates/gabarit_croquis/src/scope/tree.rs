//! Arena of scopes built during one render.
//!
//! Scopes refer to their parent and root by [`ContextId`]; parents never
//! refer to children. A child is always created after its parent, so ids grow
//! with depth along any path and dropping a suffix of the arena never leaves
//! a live scope without its parent.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use gabarit_carton::{CascadeIndex, CompactString, SmallVec, StrComparer};

use crate::config::ScopeConfig;
use crate::value::Value;

use super::context::{ContextId, ScopeContext, Template};

/// All scopes of one render, rooted at [`ContextId::ROOT`]
#[derive(Debug)]
pub struct ScopeTree {
    contexts: Vec<ScopeContext>,
    config: Arc<ScopeConfig>,
}

impl ScopeTree {
    /// Create a tree holding only its root scope
    pub fn new(config: Arc<ScopeConfig>, value: Value, template_path: Option<&str>) -> Self {
        let mut tree = Self {
            contexts: Vec::with_capacity(8),
            config,
        };
        tree.create(value, None, template_path.map(CompactString::new), None);
        tree
    }

    #[inline]
    pub fn config(&self) -> &Arc<ScopeConfig> {
        &self.config
    }

    #[inline]
    pub fn root(&self) -> &ScopeContext {
        &self.contexts[ContextId::ROOT.index()]
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut ScopeContext {
        &mut self.contexts[ContextId::ROOT.index()]
    }

    #[inline]
    pub fn get(&self, id: ContextId) -> Option<&ScopeContext> {
        self.contexts.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: ContextId) -> Option<&mut ScopeContext> {
        self.contexts.get_mut(id.index())
    }

    /// Parent scope of `id`
    #[inline]
    pub fn parent(&self, id: ContextId) -> Option<&ScopeContext> {
        self.get(id)?.parent_id().and_then(|parent| self.get(parent))
    }

    /// Number of scopes
    #[inline]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Check if empty (only root scope)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contexts.len() == 1
    }

    /// Id the next created scope will receive
    #[inline]
    pub fn next_id(&self) -> ContextId {
        ContextId::new(self.contexts.len() as u32)
    }

    /// Iterate over all scopes in creation order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ScopeContext> {
        self.contexts.iter()
    }

    /// `id` followed by each enclosing scope up to the root
    pub fn ancestors(&self, id: ContextId) -> impl Iterator<Item = &ScopeContext> {
        std::iter::successors(self.get(id), move |context| {
            context.parent_id().and_then(|parent| self.get(parent))
        })
    }

    /// Distance from the root
    #[inline]
    pub fn depth(&self, id: ContextId) -> u32 {
        self.get(id).map_or(0, ScopeContext::depth)
    }

    /// Enter a new data context below `id`.
    ///
    /// Without `value` the child evaluates against the parent's value; the
    /// partial-block template is inherited unless one is given.
    pub fn create_child_context(
        &mut self,
        id: ContextId,
        value: Option<Value>,
        partial_block_template: Option<Template>,
    ) -> ContextId {
        let parent = &self[id];
        let value = value.unwrap_or_else(|| parent.value().clone());
        let template_path = parent.template_path().map(CompactString::new);
        let partial_block_template =
            partial_block_template.or_else(|| parent.partial_block_template().cloned());

        self.create(value, Some(id), template_path, partial_block_template)
    }

    /// Create a lightweight frame below `id`, e.g. for helper options.
    ///
    /// Unlike [`create_child_context`](Self::create_child_context) the value
    /// does not fall back to the parent's.
    pub fn create_frame(&mut self, id: ContextId, value: Option<Value>) -> ContextId {
        let parent = &self[id];
        let template_path = parent.template_path().map(CompactString::new);
        let partial_block_template = parent.partial_block_template().cloned();

        self.create(
            value.unwrap_or_default(),
            Some(id),
            template_path,
            partial_block_template,
        )
    }

    /// Drop `first` and every scope created after it. The root is kept.
    pub fn discard_from(&mut self, first: ContextId) {
        let keep = first.index().max(1);
        if keep < self.contexts.len() {
            tracing::trace!(
                discarded = self.contexts.len() - keep,
                "discarding finished scopes"
            );
            self.contexts.truncate(keep);
        }
    }

    fn create(
        &mut self,
        value: Value,
        parent: Option<ContextId>,
        template_path: Option<CompactString>,
        partial_block_template: Option<Template>,
    ) -> ContextId {
        let id = self.next_id();
        let inline_partials = match parent {
            Some(parent) => self[parent].inline_partials().nested(),
            None => CascadeIndex::new(StrComparer::new(self.config.options().partial_case)),
        };

        let mut context = ScopeContext::new(
            id,
            Arc::clone(&self.config),
            value,
            parent,
            template_path,
            partial_block_template,
            inline_partials,
        );
        context.initialize(&self.contexts);

        tracing::trace!(
            scope = %id,
            parent = ?parent.map(|p| p.as_u32()),
            kind = context.value().type_name(),
            "created scope"
        );

        self.contexts.push(context);
        id
    }
}

impl Index<ContextId> for ScopeTree {
    type Output = ScopeContext;

    #[inline]
    fn index(&self, id: ContextId) -> &ScopeContext {
        &self.contexts[id.index()]
    }
}

impl IndexMut<ContextId> for ScopeTree {
    #[inline]
    fn index_mut(&mut self, id: ContextId) -> &mut ScopeContext {
        &mut self.contexts[id.index()]
    }
}

/// One line per scope, indented by depth
impl fmt::Display for ScopeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, context) in self.contexts.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for _ in 0..context.depth() {
                f.write_str("  ")?;
            }

            write!(f, "{} {}", context.id(), context.value().type_name())?;
            if let Some(path) = context.template_path() {
                write!(f, " path={path}")?;
            }

            let mut data: SmallVec<[&str; 8]> =
                context.context_data().iter().map(|(k, _)| k.as_str()).collect();
            data.sort_unstable();
            write!(f, " data=[{}]", data.join(", "))?;

            if !context.block_params().is_empty() {
                let mut params: SmallVec<[&str; 8]> =
                    context.block_params().iter().map(|(k, _)| k.as_str()).collect();
                params.sort_unstable();
                write!(f, " params=[{}]", params.join(", "))?;
            }

            let partials = context.inline_partials().local_len();
            if partials > 0 {
                write!(f, " partials={partials}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
