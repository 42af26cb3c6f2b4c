//! # Gabarit
//!
//! Scope and context resolution for logic-less templates.
//!
//! This crate re-exports the Gabarit sub-crates and adds the render
//! [`Environment`].
//!
//! ## Crates
//!
//! - [`carton`] - Bounded containers and hashing utilities
//! - [`croquis`] - Scope tree, segments, values and member access
//!
//! ## Example
//!
//! ```
//! use gabarit::{ChainSegment, ContextId, Environment, Value};
//!
//! let env = Environment::default();
//! let data = Value::object([("userId", Value::Int(42))]);
//! let value = Value::object([("name", Value::from("Alice"))]);
//! let mut tree = env.begin_render(value, Some(&data), None)?;
//!
//! let child = tree.create_child_context(
//!     ContextId::ROOT,
//!     Some(Value::object([("name", Value::from("Bob"))])),
//!     None,
//! );
//! let name = tree[child].resolve_against_value(&ChainSegment::new("name"));
//! assert_eq!(name, Some(Value::from("Bob")));
//! # Ok::<(), gabarit::RenderError>(())
//! ```

/// Bounded containers and hashing utilities.
pub use gabarit_carton as carton;

/// Scope tree, segments, values and member access.
pub use gabarit_croquis as croquis;

mod environment;
mod error;
mod helpers;

pub use environment::Environment;
pub use error::{RenderError, RenderResult};
pub use helpers::helper_missing;

pub use gabarit_croquis::{
    ChainSegment, ContextId, ObjectDescriptor, ScopeConfig, ScopeContext, ScopeOptions, ScopeTree,
    Template, UndefinedBinding, Value, WellKnownVariable,
};
