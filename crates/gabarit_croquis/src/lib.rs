//! # gabarit_croquis
//!
//! Croquis - The scope resolution layer for Gabarit.
//!
//! ## Purpose
//!
//! While a compiled template runs, every identifier it reads (`name`,
//! `@root`, `@index`, block parameters, inline partials) is resolved against
//! a tree of scopes built as the template descends into sections, blocks and
//! partials. This crate provides:
//!
//! - **Segments**: interned path identifiers and the well-known variables
//! - **Values**: the evaluation model, convertible from `serde_json`
//! - **Object descriptors**: member access per value shape
//! - **Scopes**: the scope tree and its lookup protocol
//!
//! ## Architecture
//!
//! ```text
//! gabarit_carton (bounded containers)
//!        ↓
//! gabarit_croquis (scopes)  ← This crate
//!        ↓
//!     gabarit (environment)
//! ```

mod config;
mod object;
mod scope;
mod segment;
mod value;

pub use config::{
    ConfigError, ScopeConfig, ScopeOptions, DEFAULT_DATA_LAYOUT, EXTENSIONS_LAYOUT,
};
pub use object::{
    IndexedAccessor, MappingAccessor, MemberAccessor, ObjectDescriptor, ObjectDescriptorProvider,
    Properties, RecordAccessor, Shape,
};
pub use scope::*;
pub use segment::{ChainSegment, SegmentComparer, SegmentFlags, WellKnownVariable};
pub use value::{HashParameters, ObjectMap, Record, UndefinedBinding, Value};
