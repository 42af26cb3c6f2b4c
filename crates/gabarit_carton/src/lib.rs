//! Carton - The artist's toolbox for Gabarit.
//!
//! This crate provides the allocation-light containers the scope engine is
//! built from. Every container here trades generality for predictable layout:
//! capacities are fixed by the call site, lookups never allocate.
//!
//! # Modules
//!
//! - **FixedSizeMap**: open-addressed map with a fixed slot count and reusable slot indices
//! - **CascadeIndex**: overlay map that falls through to an outer level on a miss
//! - **DeferredValue**: value computed once from its owner on first access
//! - **Comparers**: per-container key equality and hashing policy
//!
//! # Example
//!
//! ```
//! use gabarit_carton::{CompactString, FixedSizeMap, MapLayout, StrComparer};
//!
//! let mut map = FixedSizeMap::new(MapLayout::new(8, 4), StrComparer::default());
//! let index = map.add_or_replace(CompactString::new("title"), 1);
//!
//! assert_eq!(map.try_get(&CompactString::new("title")), Some(&1));
//! assert_eq!(map.try_get_at(index), Some(&1));
//! ```

mod cascade_index;
mod comparer;
mod deferred;
mod error;
mod fixed_size_map;

pub mod hash;

pub use cascade_index::CascadeIndex;
pub use comparer::{CaseSensitivity, KeyComparer, StrComparer};
pub use deferred::DeferredValue;
pub use error::CapacityError;
pub use fixed_size_map::{EntryIndex, FixedSizeMap, MapLayout};

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export once_cell cells used for lazily initialized state
pub use once_cell::sync::Lazy;
pub use once_cell::unsync::OnceCell;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};
