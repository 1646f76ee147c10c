//! Deterministic text hash
//!
//! The stand-in for randomness everywhere in the generator: identical input
//! always produces identical output, across processes and restarts. The
//! recurrence is `h = h*31 + unit` over UTF-16 code units in wrapped 32-bit
//! signed arithmetic, absolute value at the end. Generated content stays
//! stable only as long as this stays bit-exact, so don't "improve" it.

/// Hash a string to a non-negative integer.
pub fn text_hash(s: &str) -> u32 {
    let mut h: i32 = 0;
    for unit in s.encode_utf16() {
        // (h << 5) - h == h * 31, with 32-bit wraparound preserved
        h = h
            .wrapping_shl(5)
            .wrapping_sub(h)
            .wrapping_add(unit as i32);
    }
    h.unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = text_hash("TaskFlow ProA smart task management app");
        let b = text_hash("TaskFlow ProA smart task management app");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_empty_string_is_zero() {
        assert_eq!(text_hash(""), 0);
    }

    #[test]
    fn test_hash_reference_values() {
        // Spot-checked against the h*31 recurrence by hand:
        // "a" = 97, "ab" = 97*31 + 98 = 3105
        assert_eq!(text_hash("a"), 97);
        assert_eq!(text_hash("ab"), 3105);
        assert_eq!(text_hash("abc"), 3105 * 31 + 99);
    }

    #[test]
    fn test_hash_distinguishes_suffixes() {
        assert_ne!(text_hash("ideaoperatordiag"), text_hash("ideaoperatorpresc"));
    }

    #[test]
    fn test_hash_wraps_without_panicking_on_long_input() {
        let long = "x".repeat(10_000);
        // Wrapped arithmetic must not panic and the result must be stable.
        assert_eq!(text_hash(&long), text_hash(&long));
    }

    #[test]
    fn test_hash_handles_non_ascii() {
        // Multi-byte chars hash by UTF-16 code unit, not by byte.
        assert_ne!(text_hash("café"), text_hash("cafe"));
        assert_eq!(text_hash("日本語"), text_hash("日本語"));
    }
}
