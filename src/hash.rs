//! Deterministic pass digests.
//!
//! Shapes are fed field by field into a blake3 hasher so that two replays of
//! the same pass can be compared with a single integer.

// =============================================================================
// StableHasher - Builder Pattern
// =============================================================================

/// A deterministic hasher using blake3.
///
/// Unlike `std::hash::Hasher`, the output is stable across processes and
/// platforms, and floats are hashed by bit pattern.
#[derive(Clone)]
pub struct StableHasher {
    inner: blake3::Hasher,
}

impl StableHasher {
    /// Create a new hasher.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update(mut self, data: &[u8]) -> Self {
        self.inner.update(data);
        self
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(self, s: &str) -> Self {
        self.update_usize(s.len()).update(s.as_bytes())
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(self, v: u64) -> Self {
        self.update(&v.to_le_bytes())
    }

    /// Update with a usize value (as u64, little-endian).
    #[inline]
    pub fn update_usize(self, v: usize) -> Self {
        self.update_u64(v as u64)
    }

    /// Update with an f32 bit pattern.
    #[inline]
    pub fn update_f32(self, v: f32) -> Self {
        self.update(&v.to_bits().to_le_bytes())
    }

    /// Update with a flag.
    #[inline]
    pub fn update_bool(self, v: bool) -> Self {
        self.update(&[v as u8])
    }

    /// Finish and return the first 8 bytes of the blake3 output.
    #[inline]
    pub fn finish(self) -> u64 {
        let hash = self.inner.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Types that feed themselves into a [`StableHasher`].
pub trait StableHash {
    /// Append this value to the hasher.
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher;

    /// Digest of this value alone.
    fn digest(&self) -> u64 {
        self.stable_hash(StableHasher::new()).finish()
    }
}

impl<T: StableHash> StableHash for [T] {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        self.iter()
            .fold(hasher.update_usize(self.len()), |h, item| item.stable_hash(h))
    }
}

impl<T: StableHash> StableHash for Option<T> {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        match self {
            Some(value) => value.stable_hash(hasher.update_bool(true)),
            None => hasher.update_bool(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = StableHasher::new().update_str("pass").update_u64(1).finish();
        let b = StableHasher::new().update_str("pass").update_u64(1).finish();
        assert_eq!(a, b);
    }

    #[test]
    fn test_string_boundaries_matter() {
        let a = StableHasher::new().update_str("ab").update_str("c").finish();
        let b = StableHasher::new().update_str("a").update_str("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_float_bits() {
        let a = StableHasher::new().update_f32(1.0).finish();
        let b = StableHasher::new().update_f32(1.0 + f32::EPSILON).finish();
        assert_ne!(a, b);
    }
}
