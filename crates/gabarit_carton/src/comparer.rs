//! Key comparison policies.
//!
//! Case sensitivity belongs to the container, not to the key: the same
//! identifier can live in a case-sensitive data map and a case-insensitive
//! partial registry at once.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::hash::{hash_str, hash_str_ignore_case};

/// Equality and hashing used by a container for its keys.
///
/// Implementations must keep the two consistent: keys that compare equal
/// must hash equal.
pub trait KeyComparer<K: ?Sized> {
    /// Hash of `key` under this policy
    fn hash(&self, key: &K) -> u64;

    /// Whether `a` and `b` denote the same key
    fn equals(&self, a: &K, b: &K) -> bool;
}

/// Case policy for textual keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseSensitivity {
    /// Keys match only byte-for-byte
    #[default]
    Sensitive,
    /// Keys match ignoring ASCII case
    Insensitive,
}

impl CaseSensitivity {
    /// Hash `text` under this policy
    #[inline]
    pub fn hash(self, text: &str) -> u64 {
        match self {
            Self::Sensitive => hash_str(text),
            Self::Insensitive => hash_str_ignore_case(text),
        }
    }

    /// Compare two strings under this policy
    #[inline]
    pub fn equals(self, a: &str, b: &str) -> bool {
        match self {
            Self::Sensitive => a == b,
            Self::Insensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// Comparer for string keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrComparer {
    pub case: CaseSensitivity,
}

impl StrComparer {
    /// Comparer with the given case policy
    #[inline]
    pub const fn new(case: CaseSensitivity) -> Self {
        Self { case }
    }

    /// Comparer ignoring ASCII case
    #[inline]
    pub const fn ignore_case() -> Self {
        Self::new(CaseSensitivity::Insensitive)
    }
}

impl KeyComparer<str> for StrComparer {
    #[inline]
    fn hash(&self, key: &str) -> u64 {
        self.case.hash(key)
    }

    #[inline]
    fn equals(&self, a: &str, b: &str) -> bool {
        self.case.equals(a, b)
    }
}

impl KeyComparer<CompactString> for StrComparer {
    #[inline]
    fn hash(&self, key: &CompactString) -> u64 {
        self.case.hash(key)
    }

    #[inline]
    fn equals(&self, a: &CompactString, b: &CompactString) -> bool {
        self.case.equals(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_comparer() {
        let comparer = StrComparer::default();
        assert!(comparer.equals("name", "name"));
        assert!(!comparer.equals("Name", "name"));
    }

    #[test]
    fn test_insensitive_comparer() {
        let comparer = StrComparer::ignore_case();
        let a = CompactString::new("Layout");
        let b = CompactString::new("layout");
        assert!(comparer.equals(&a, &b));
        assert_eq!(comparer.hash(&a), comparer.hash(&b));
    }

    #[test]
    fn test_case_sensitivity_deserialize() {
        let case: CaseSensitivity = serde_json::from_str("\"insensitive\"").unwrap();
        assert_eq!(case, CaseSensitivity::Insensitive);
    }
}
