//! Fast hashing utilities using xxHash3.
//!
//! Identifier hashes are computed once (when a segment is interned, or when a
//! key is inserted) and then carried alongside the key, so lookups compare
//! stored hashes before touching the key text.

use smallvec::SmallVec;
use xxhash_rust::xxh3::xxh3_64;

/// Compute a 64-bit hash of the given bytes using xxHash3.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Compute a 64-bit hash of the given string using xxHash3.
#[inline]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

/// Compute a hash that is equal for strings differing only in ASCII case.
#[inline]
pub fn hash_str_ignore_case(data: &str) -> u64 {
    if !data.bytes().any(|b| b.is_ascii_uppercase()) {
        return hash_str(data);
    }

    let lowered: SmallVec<[u8; 64]> = data.bytes().map(|b| b.to_ascii_lowercase()).collect();
    xxh3_64(&lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_consistency() {
        let hash1 = hash_str("userId");
        let hash2 = hash_str("userId");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_difference() {
        assert_ne!(hash_str("root"), hash_str("parent"));
    }

    #[test]
    fn test_ignore_case_folds_ascii() {
        assert_eq!(hash_str_ignore_case("Header"), hash_str_ignore_case("header"));
        assert_eq!(hash_str_ignore_case("header"), hash_str("header"));
        assert_ne!(hash_str("Header"), hash_str("header"));
    }

    #[test]
    fn test_ignore_case_long_input() {
        let upper = "A".repeat(200);
        let lower = "a".repeat(200);
        assert_eq!(hash_str_ignore_case(&upper), hash_bytes(lower.as_bytes()));
    }
}
