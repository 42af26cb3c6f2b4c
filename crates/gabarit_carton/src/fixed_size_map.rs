//! Fixed-capacity open-addressed map.
//!
//! The slot count and probe depth are fixed when the map is built. Inserting
//! returns an [`EntryIndex`] that reads the entry back without hashing the key
//! again, and two maps built from the same [`MapLayout`] place a given key in
//! the same slot when filled the same way, so an index taken from one map can
//! address the other.

use crate::comparer::KeyComparer;
use crate::error::CapacityError;

/// Slot count and probe depth of a [`FixedSizeMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayout {
    /// Number of slots
    pub capacity: usize,
    /// Maximum number of slots inspected from a key's home slot
    pub max_probe: usize,
}

impl MapLayout {
    /// Create a layout. Panics if `max_probe` is zero or exceeds `capacity`.
    pub const fn new(capacity: usize, max_probe: usize) -> Self {
        assert!(max_probe > 0, "max_probe must be at least 1");
        assert!(max_probe <= capacity, "max_probe cannot exceed capacity");
        Self {
            capacity,
            max_probe,
        }
    }

    #[inline]
    fn home_slot(&self, hash: u64) -> usize {
        (hash % self.capacity as u64) as usize
    }
}

/// Position of an entry inside a [`FixedSizeMap`].
///
/// Carries the key's hash as a fingerprint: reading a slot that now holds a
/// different key is reported as a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryIndex {
    slot: u32,
    fingerprint: u64,
}

impl EntryIndex {
    #[inline]
    const fn new(slot: usize, fingerprint: u64) -> Self {
        Self {
            slot: slot as u32,
            fingerprint,
        }
    }

    /// Slot position
    #[inline]
    pub const fn slot(self) -> usize {
        self.slot as usize
    }
}

#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

/// Fixed-capacity key-value map with linear probing
#[derive(Clone)]
pub struct FixedSizeMap<K, V, C> {
    entries: Box<[Option<Entry<K, V>>]>,
    len: usize,
    layout: MapLayout,
    comparer: C,
}

impl<K, V, C> FixedSizeMap<K, V, C>
where
    C: KeyComparer<K>,
{
    /// Create an empty map with the given layout and key policy
    pub fn new(layout: MapLayout, comparer: C) -> Self {
        Self {
            entries: (0..layout.capacity).map(|_| None).collect(),
            len: 0,
            layout,
            comparer,
        }
    }

    /// Layout this map was built with
    #[inline]
    pub fn layout(&self) -> MapLayout {
        self.layout
    }

    /// Key policy of this map
    #[inline]
    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `value` under `key`, replacing any previous value.
    ///
    /// Replacing keeps the entry in its slot, so the returned index equals the
    /// one returned when the key was first inserted.
    pub fn try_add_or_replace(&mut self, key: K, value: V) -> Result<EntryIndex, CapacityError> {
        let hash = self.comparer.hash(&key);
        let slot = self.find_slot(&key, hash)?;

        match &mut self.entries[slot] {
            Some(entry) => entry.value = value,
            None => {
                self.entries[slot] = Some(Entry { key, value, hash });
                self.len += 1;
            }
        }

        Ok(EntryIndex::new(slot, hash))
    }

    /// Insert `value` under `key`, replacing any previous value.
    ///
    /// # Panics
    /// Panics when no free slot exists within the probe limit. The layout is
    /// a property of the call site, so overflowing it is a defect there.
    pub fn add_or_replace(&mut self, key: K, value: V) -> EntryIndex {
        match self.try_add_or_replace(key, value) {
            Ok(index) => index,
            Err(err) => {
                tracing::error!(
                    capacity = self.layout.capacity,
                    max_probe = self.layout.max_probe,
                    len = self.len,
                    "fixed-size map layout too small for its call site"
                );
                panic!("{err}");
            }
        }
    }

    /// Look up a value by key
    pub fn try_get(&self, key: &K) -> Option<&V> {
        let hash = self.comparer.hash(key);
        self.position(key, hash)
            .and_then(|slot| self.entries[slot].as_ref())
            .map(|entry| &entry.value)
    }

    /// Look up a value by a previously returned index
    #[inline]
    pub fn try_get_at(&self, index: EntryIndex) -> Option<&V> {
        self.entries
            .get(index.slot())?
            .as_ref()
            .filter(|entry| entry.hash == index.fingerprint)
            .map(|entry| &entry.value)
    }

    /// Index of `key`, if present
    pub fn index_of(&self, key: &K) -> Option<EntryIndex> {
        let hash = self.comparer.hash(key);
        self.position(key, hash)
            .map(|slot| EntryIndex::new(slot, hash))
    }

    /// Whether `key` is present
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.index_of(key).is_some()
    }

    /// Iterate over all entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries
            .iter()
            .flatten()
            .map(|entry| (&entry.key, &entry.value))
    }

    /// Copy every entry into `other`.
    ///
    /// When `other` is empty and shares this map's layout the slots are
    /// copied as they are, so every index valid here is valid in `other`.
    /// Otherwise entries are re-inserted one by one.
    pub fn copy_to(&self, other: &mut Self)
    where
        K: Clone,
        V: Clone,
    {
        if other.is_empty() && other.layout == self.layout {
            other.entries.clone_from_slice(&self.entries);
            other.len = self.len;
            return;
        }

        for entry in self.entries.iter().flatten() {
            other.add_or_replace(entry.key.clone(), entry.value.clone());
        }
    }

    /// Slot holding `key`, or the first free slot on its probe path.
    fn find_slot(&self, key: &K, hash: u64) -> Result<usize, CapacityError> {
        let home = self.layout.home_slot(hash);

        for probe in 0..self.layout.max_probe {
            let slot = (home + probe) % self.layout.capacity;
            match &self.entries[slot] {
                None => return Ok(slot),
                Some(entry) if entry.hash == hash && self.comparer.equals(&entry.key, key) => {
                    return Ok(slot)
                }
                Some(_) => {}
            }
        }

        Err(CapacityError::ProbeLimitExceeded {
            capacity: self.layout.capacity,
            max_probe: self.layout.max_probe,
        })
    }

    /// Slot holding `key`. Entries are never removed, so the first empty
    /// slot on the probe path ends the search.
    fn position(&self, key: &K, hash: u64) -> Option<usize> {
        let home = self.layout.home_slot(hash);

        for probe in 0..self.layout.max_probe {
            let slot = (home + probe) % self.layout.capacity;
            match &self.entries[slot] {
                None => return None,
                Some(entry) if entry.hash == hash && self.comparer.equals(&entry.key, key) => {
                    return Some(slot)
                }
                Some(_) => {}
            }
        }

        None
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, C> std::fmt::Debug for FixedSizeMap<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .flatten()
                    .map(|entry| (&entry.key, &entry.value)),
            )
            .finish()
    }
}
