//! Cascading overlay map.
//!
//! Each level holds its own entries and points at an outer level. Lookups
//! walk outward until a match is found, registrations only ever touch the
//! local level. Handles are cheap to clone and share their level, so a
//! nested level can keep its outer level alive without copying it.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::comparer::KeyComparer;

type Bucket<K, V> = SmallVec<[(K, V); 1]>;

struct Level<K, V, C> {
    entries: RefCell<FxHashMap<u64, Bucket<K, V>>>,
    outer: Option<Rc<Level<K, V, C>>>,
    comparer: C,
}

impl<K, V, C: KeyComparer<K>> Level<K, V, C> {
    fn find(&self, key: &K, hash: u64) -> Option<V>
    where
        V: Clone,
    {
        self.entries.borrow().get(&hash).and_then(|bucket| {
            bucket
                .iter()
                .find(|(existing, _)| self.comparer.equals(existing, key))
                .map(|(_, value)| value.clone())
        })
    }
}

/// Overlay map whose misses fall through to an outer level
pub struct CascadeIndex<K, V, C> {
    level: Rc<Level<K, V, C>>,
}

impl<K, V, C> Clone for CascadeIndex<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            level: Rc::clone(&self.level),
        }
    }
}

impl<K, V, C> CascadeIndex<K, V, C>
where
    C: KeyComparer<K> + Clone,
{
    /// Create an outermost level
    pub fn new(comparer: C) -> Self {
        Self {
            level: Rc::new(Level {
                entries: RefCell::new(FxHashMap::default()),
                outer: None,
                comparer,
            }),
        }
    }

    /// Create a new empty level whose outer level is `self`
    pub fn nested(&self) -> Self {
        Self {
            level: Rc::new(Level {
                entries: RefCell::new(FxHashMap::default()),
                outer: Some(Rc::clone(&self.level)),
                comparer: self.level.comparer.clone(),
            }),
        }
    }

    /// The outer level, if any
    pub fn outer(&self) -> Option<Self> {
        self.level
            .outer
            .as_ref()
            .map(|level| Self {
                level: Rc::clone(level),
            })
    }

    /// Whether two handles refer to the same level
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.level, &other.level)
    }

    /// Register `value` under `key` on this level, shadowing outer levels
    pub fn register(&self, key: K, value: V) {
        let hash = self.level.comparer.hash(&key);
        let mut entries = self.level.entries.borrow_mut();
        let bucket = entries.entry(hash).or_default();

        match bucket
            .iter_mut()
            .find(|(existing, _)| self.level.comparer.equals(existing, &key))
        {
            Some((_, slot)) => *slot = value,
            None => bucket.push((key, value)),
        }
    }

    /// Find the nearest value registered under `key`
    pub fn lookup(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let hash = self.level.comparer.hash(key);
        let mut level = Some(&self.level);

        while let Some(current) = level {
            if let Some(value) = current.find(key, hash) {
                return Some(value);
            }
            level = current.outer.as_ref();
        }

        None
    }

    /// Whether `key` resolves on this level or any outer level
    pub fn contains_key(&self, key: &K) -> bool
    where
        V: Clone,
    {
        self.lookup(key).is_some()
    }

    /// Number of entries registered on this level only
    pub fn local_len(&self) -> usize {
        self.level.entries.borrow().values().map(|b| b.len()).sum()
    }

    /// Nesting depth; the outermost level has depth 0
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut level = self.level.outer.as_ref();
        while let Some(current) = level {
            depth += 1;
            level = current.outer.as_ref();
        }
        depth
    }
}

impl<K, V, C> std::fmt::Debug for CascadeIndex<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeIndex")
            .field(
                "local_len",
                &self.level.entries.borrow().values().map(|b| b.len()).sum::<usize>(),
            )
            .field("has_outer", &self.level.outer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::StrComparer;
    use compact_str::CompactString;

    fn key(name: &str) -> CompactString {
        CompactString::new(name)
    }

    #[test]
    fn test_outer_entry_visible_from_nested() {
        let ancestor = CascadeIndex::new(StrComparer::default());
        ancestor.register(key("header"), 1);

        let child = ancestor.nested();
        let grandchild = child.nested();

        assert_eq!(grandchild.lookup(&key("header")), Some(1));
        assert_eq!(grandchild.depth(), 2);
    }

    #[test]
    fn test_nearest_entry_shadows_outer() {
        let ancestor = CascadeIndex::new(StrComparer::default());
        ancestor.register(key("header"), 1);

        let child = ancestor.nested();
        child.register(key("header"), 2);

        assert_eq!(child.lookup(&key("header")), Some(2));
        assert_eq!(ancestor.lookup(&key("header")), Some(1));
    }

    #[test]
    fn test_register_never_touches_outer() {
        let ancestor: CascadeIndex<CompactString, i32, _> =
            CascadeIndex::new(StrComparer::default());
        let child = ancestor.nested();
        child.register(key("footer"), 3);

        assert_eq!(ancestor.lookup(&key("footer")), None);
        assert_eq!(ancestor.local_len(), 0);
        assert_eq!(child.local_len(), 1);
    }

    #[test]
    fn test_later_outer_registration_is_visible() {
        let ancestor = CascadeIndex::new(StrComparer::default());
        let child = ancestor.nested();
        ancestor.register(key("late"), 7);

        assert_eq!(child.lookup(&key("late")), Some(7));
    }

    #[test]
    fn test_outer_handle_is_shared() {
        let ancestor: CascadeIndex<CompactString, i32, _> =
            CascadeIndex::new(StrComparer::default());
        let child = ancestor.nested();

        assert!(child.outer().unwrap().ptr_eq(&ancestor));
        assert!(ancestor.outer().is_none());
    }

    #[test]
    fn test_case_insensitive_registry() {
        let registry = CascadeIndex::new(StrComparer::ignore_case());
        registry.register(key("Layout"), 1);
        registry.register(key("layout"), 2);

        assert_eq!(registry.local_len(), 1);
        assert_eq!(registry.nested().lookup(&key("LAYOUT")), Some(2));
    }
}
