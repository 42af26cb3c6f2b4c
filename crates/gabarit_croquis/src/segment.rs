//! Path segments and well-known variables.
//!
//! A [`ChainSegment`] is one identifier of a dotted path (`user`, `@index`,
//! `[first name]`). Segments are interned process-wide: creating the same
//! text twice yields handles to one shared entry, whose hashes were computed
//! once at interning.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use gabarit_carton::{bitflags, CaseSensitivity, CompactString, FxHashMap, KeyComparer, Lazy};

/// Special variables with a dedicated lookup slot in every scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WellKnownVariable {
    /// `@root` - value of the tree root
    Root = 0,
    /// `@parent` - value of the enclosing scope
    Parent = 1,
    /// `this` - current value
    This = 2,
    /// `@index` - iteration index
    Index = 3,
    /// `@key` - iteration key
    Key = 4,
    /// `@value` - iteration value
    Value = 5,
    /// `@first` - first iteration flag
    First = 6,
    /// `@last` - last iteration flag
    Last = 7,
}

impl WellKnownVariable {
    /// Number of variants, and the size of a scope's slot table
    pub const COUNT: usize = 8;

    /// All variants in slot order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Root,
        Self::Parent,
        Self::This,
        Self::Index,
        Self::Key,
        Self::Value,
        Self::First,
        Self::Last,
    ];

    /// Slot position
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name without the `@` marker
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Parent => "parent",
            Self::This => "this",
            Self::Index => "index",
            Self::Key => "key",
            Self::Value => "value",
            Self::First => "first",
            Self::Last => "last",
        }
    }

    /// Canonical source text (`@root`, `this`, ...)
    #[inline]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Root => "@root",
            Self::Parent => "@parent",
            Self::This => "this",
            Self::Index => "@index",
            Self::Key => "@key",
            Self::Value => "@value",
            Self::First => "@first",
            Self::Last => "@last",
        }
    }

    /// Variant for a data-reference name (without `@`)
    pub fn from_data_name(name: &str) -> Option<Self> {
        match name {
            "root" => Some(Self::Root),
            "parent" => Some(Self::Parent),
            "index" => Some(Self::Index),
            "key" => Some(Self::Key),
            "value" => Some(Self::Value),
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            _ => None,
        }
    }
}

bitflags! {
    /// Syntactic properties of a segment
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SegmentFlags: u8 {
        /// Written with a leading `@`
        const DATA_REFERENCE = 1 << 0;
        /// `this` or `.`
        const THIS = 1 << 1;
        /// Written as a `[...]` literal
        const LITERAL = 1 << 2;
    }
}

#[derive(Debug)]
struct SegmentData {
    /// Text as written
    text: CompactString,
    /// Text without `@` and `[...]` decoration
    name: CompactString,
    hash: u64,
    hash_ignore_case: u64,
    well_known: Option<WellKnownVariable>,
    flags: SegmentFlags,
    /// Parsed value for purely numeric names
    array_index: Option<usize>,
}

/// Interned identifier of one path component.
///
/// Equality and hashing follow the undecorated name, so `@root` and `root`
/// address the same entry of a data map while keeping their own flags.
#[derive(Clone)]
pub struct ChainSegment(Arc<SegmentData>);

type SegmentTable = Lazy<RwLock<FxHashMap<CompactString, ChainSegment>>>;

static SEGMENTS: SegmentTable = Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Verbatim segments whose text would otherwise parse as decorated
static VERBATIM_SEGMENTS: SegmentTable = Lazy::new(|| RwLock::new(FxHashMap::default()));

static WELL_KNOWN_SEGMENTS: Lazy<[ChainSegment; WellKnownVariable::COUNT]> =
    Lazy::new(|| WellKnownVariable::ALL.map(|variable| ChainSegment::new(variable.text())));

fn intern(table: &SegmentTable, text: &str, make: fn(&str) -> SegmentData) -> ChainSegment {
    {
        let segments = table.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(segment) = segments.get(text) {
            return segment.clone();
        }
    }

    let mut segments = table.write().unwrap_or_else(PoisonError::into_inner);
    segments
        .entry(CompactString::new(text))
        .or_insert_with(|| ChainSegment(Arc::new(make(text))))
        .clone()
}

impl ChainSegment {
    /// Intern `text`
    pub fn new(text: &str) -> Self {
        intern(&SEGMENTS, text, SegmentData::parse)
    }

    /// Intern `text` as a plain name, without `@` or `[...]` parsing.
    ///
    /// Keys enumerated from host data go through here so that `name()`
    /// always equals the key, e.g. a JSON-LD `@type` property.
    pub fn verbatim(text: &str) -> Self {
        let segment = Self::new(text);
        if segment.flags().is_empty() {
            return segment;
        }
        intern(&VERBATIM_SEGMENTS, text, SegmentData::verbatim)
    }

    /// Shared segment for a well-known variable
    #[inline]
    pub fn well_known_segment(variable: WellKnownVariable) -> Self {
        WELL_KNOWN_SEGMENTS[variable.index()].clone()
    }

    /// Text as written
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    /// Name without `@` or `[...]` decoration
    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Well-known variable this segment denotes, if any
    #[inline]
    pub fn well_known(&self) -> Option<WellKnownVariable> {
        self.0.well_known
    }

    /// Syntactic flags
    #[inline]
    pub fn flags(&self) -> SegmentFlags {
        self.0.flags
    }

    /// Whether the segment was written as `@name`
    #[inline]
    pub fn is_data_reference(&self) -> bool {
        self.0.flags.contains(SegmentFlags::DATA_REFERENCE)
    }

    /// Numeric value of the name when it is a plain array index
    #[inline]
    pub fn array_index(&self) -> Option<usize> {
        self.0.array_index
    }

    /// Precomputed hash of the name under `case`
    #[inline]
    pub fn hash_for(&self, case: CaseSensitivity) -> u64 {
        match case {
            CaseSensitivity::Sensitive => self.0.hash,
            CaseSensitivity::Insensitive => self.0.hash_ignore_case,
        }
    }

    /// Whether both handles share one interned entry
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl SegmentData {
    fn verbatim(text: &str) -> Self {
        Self::build(text, text, SegmentFlags::LITERAL, None)
    }

    fn parse(text: &str) -> Self {
        let mut flags = SegmentFlags::empty();
        let mut name = text;

        if let Some(rest) = name.strip_prefix('@') {
            flags |= SegmentFlags::DATA_REFERENCE;
            name = rest;
        }
        if let Some(inner) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
            flags |= SegmentFlags::LITERAL;
            name = inner;
        }

        let well_known = if flags.contains(SegmentFlags::DATA_REFERENCE) {
            WellKnownVariable::from_data_name(name)
        } else if !flags.contains(SegmentFlags::LITERAL) && (name == "this" || name == ".") {
            flags |= SegmentFlags::THIS;
            Some(WellKnownVariable::This)
        } else {
            None
        };

        Self::build(text, name, flags, well_known)
    }

    fn build(
        text: &str,
        name: &str,
        flags: SegmentFlags,
        well_known: Option<WellKnownVariable>,
    ) -> Self {
        let array_index = if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            name.parse().ok()
        } else {
            None
        };

        Self {
            text: CompactString::new(text),
            name: CompactString::new(name),
            hash: CaseSensitivity::Sensitive.hash(name),
            hash_ignore_case: CaseSensitivity::Insensitive.hash(name),
            well_known,
            flags,
            array_index,
        }
    }
}

impl PartialEq for ChainSegment {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.0.hash == other.0.hash && self.0.name == other.0.name)
    }
}

impl Eq for ChainSegment {}

impl std::hash::Hash for ChainSegment {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Debug for ChainSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainSegment({:?})", self.as_str())
    }
}

impl fmt::Display for ChainSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ChainSegment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Comparer for segment-keyed containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentComparer {
    pub case: CaseSensitivity,
}

impl SegmentComparer {
    #[inline]
    pub const fn new(case: CaseSensitivity) -> Self {
        Self { case }
    }
}

impl KeyComparer<ChainSegment> for SegmentComparer {
    #[inline]
    fn hash(&self, key: &ChainSegment) -> u64 {
        key.hash_for(self.case)
    }

    #[inline]
    fn equals(&self, a: &ChainSegment, b: &ChainSegment) -> bool {
        a.ptr_eq(b) || self.case.equals(a.name(), b.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_shares_entry() {
        let a = ChainSegment::new("userName");
        let b = ChainSegment::new("userName");
        assert!(a.ptr_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_data_reference_tagging() {
        let root = ChainSegment::new("@root");
        assert!(root.is_data_reference());
        assert_eq!(root.name(), "root");
        assert_eq!(root.well_known(), Some(WellKnownVariable::Root));

        let index = ChainSegment::new("@index");
        assert_eq!(index.well_known(), Some(WellKnownVariable::Index));

        let custom = ChainSegment::new("@userId");
        assert!(custom.is_data_reference());
        assert_eq!(custom.well_known(), None);
    }

    #[test]
    fn test_bare_names_are_ordinary() {
        assert_eq!(ChainSegment::new("root").well_known(), None);
        assert_eq!(ChainSegment::new("index").well_known(), None);
        assert!(!ChainSegment::new("index").is_data_reference());
    }

    #[test]
    fn test_this_is_well_known() {
        assert_eq!(
            ChainSegment::new("this").well_known(),
            Some(WellKnownVariable::This)
        );
        assert!(ChainSegment::new(".").flags().contains(SegmentFlags::THIS));
        assert_eq!(ChainSegment::new("[this]").well_known(), None);
    }

    #[test]
    fn test_literal_segment() {
        let segment = ChainSegment::new("[first name]");
        assert!(segment.flags().contains(SegmentFlags::LITERAL));
        assert_eq!(segment.name(), "first name");
    }

    #[test]
    fn test_equality_ignores_decoration() {
        assert_eq!(ChainSegment::new("@root"), ChainSegment::new("root"));
        assert_ne!(ChainSegment::new("@root"), ChainSegment::new("@parent"));
    }

    #[test]
    fn test_verbatim_keeps_decoration_in_name() {
        let key = ChainSegment::verbatim("@type");
        assert_eq!(key.name(), "@type");
        assert_eq!(key.as_str(), "@type");
        assert!(!key.is_data_reference());
        assert_eq!(key.well_known(), None);
        assert!(key.ptr_eq(&ChainSegment::verbatim("@type")));

        assert_ne!(key, ChainSegment::new("@type"));
        assert_eq!(key, ChainSegment::new("[@type]"));
        assert_eq!(key, ChainSegment::new("@[@type]"));

        assert_eq!(ChainSegment::verbatim("[a b]").name(), "[a b]");
        assert_eq!(ChainSegment::verbatim("@root").well_known(), None);
        assert_eq!(ChainSegment::verbatim("this").well_known(), None);
    }

    #[test]
    fn test_verbatim_plain_names_share_entry() {
        let plain = ChainSegment::verbatim("title");
        assert!(plain.ptr_eq(&ChainSegment::new("title")));
    }

    #[test]
    fn test_array_index() {
        assert_eq!(ChainSegment::new("12").array_index(), Some(12));
        assert_eq!(ChainSegment::new("1a").array_index(), None);
        assert_eq!(ChainSegment::new("").array_index(), None);
    }

    #[test]
    fn test_comparer_case_policy() {
        let upper = ChainSegment::new("Title");
        let lower = ChainSegment::new("title");

        let sensitive = SegmentComparer::new(CaseSensitivity::Sensitive);
        assert!(!sensitive.equals(&upper, &lower));

        let insensitive = SegmentComparer::new(CaseSensitivity::Insensitive);
        assert!(insensitive.equals(&upper, &lower));
        assert_eq!(insensitive.hash(&upper), insensitive.hash(&lower));
    }

    #[test]
    fn test_well_known_segments_match_text() {
        for variable in WellKnownVariable::ALL {
            let segment = ChainSegment::well_known_segment(variable);
            assert_eq!(segment.as_str(), variable.text());
            assert_eq!(segment.well_known(), Some(variable));
            assert_eq!(WellKnownVariable::ALL[variable.index()], variable);
        }
    }
}
