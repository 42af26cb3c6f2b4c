//! Evaluation scopes for template rendering.
//!
//! A render builds one [`ScopeTree`]. Sections, iterations and partial calls
//! descend into child scopes; every scope resolves identifiers against its
//! block parameters, its current value and the data inherited from the root.
//!
//! ## Module Structure
//!
//! - [`context`] - `ScopeContext`, the scope node and its lookup protocol
//! - [`tree`] - `ScopeTree`, the arena owning every scope of a render

mod context;
mod tree;

pub use context::{ContextId, DataMap, PartialRegistry, ScopeContext, Template};
pub use tree::ScopeTree;
