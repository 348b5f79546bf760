//! The 48-bit linear congruential generator used by pre-overhaul seeds.

use crate::random::{PositionalRandom, Random, RandomSource, RandomSplitter, get_seed};

const MODULUS_BITS: u32 = 48;
const MODULUS_MASK: u64 = (1 << MODULUS_BITS) - 1;
const MULTIPLIER: u64 = 0x5_DEEC_E66D;
const INCREMENT: u64 = 11;

const FLOAT_UNIT: f32 = 1.0 / (1u32 << 24) as f32;
const DOUBLE_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

/// Java `String.hashCode` over UTF-16 code units.
#[must_use]
pub fn java_string_hash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Legacy LCG state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRandom {
    seed: u64,
}

impl LegacyRandom {
    /// Creates a generator from a 64-bit seed.
    #[must_use]
    pub const fn from_seed(seed: u64) -> Self {
        Self {
            seed: (seed ^ MULTIPLIER) & MODULUS_MASK,
        }
    }

    #[inline]
    const fn next(&mut self, bits: u32) -> i32 {
        self.seed = self
            .seed
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MODULUS_MASK;
        (self.seed >> (MODULUS_BITS - bits)) as i64 as i32
    }
}

impl Random for LegacyRandom {
    fn set_seed(&mut self, seed: u64) {
        *self = Self::from_seed(seed);
    }

    #[inline]
    fn next_i32(&mut self) -> i32 {
        self.next(32)
    }

    fn next_i32_bounded(&mut self, bound: i32) -> i32 {
        debug_assert!(bound > 0, "bound must be positive");
        if bound & bound.wrapping_neg() == bound {
            return ((i64::from(bound) * i64::from(self.next(31))) >> 31) as i32;
        }
        loop {
            let bits = self.next(31);
            let value = bits % bound;
            if bits.wrapping_sub(value).wrapping_add(bound - 1) >= 0 {
                return value;
            }
        }
    }

    fn next_i64(&mut self) -> i64 {
        let high = i64::from(self.next(32));
        let low = i64::from(self.next(32));
        (high << 32).wrapping_add(low)
    }

    fn next_f32(&mut self) -> f32 {
        self.next(24) as f32 * FLOAT_UNIT
    }

    fn next_f64(&mut self) -> f64 {
        let high = i64::from(self.next(26));
        let low = i64::from(self.next(27));
        ((high << 27) + low) as f64 * DOUBLE_UNIT
    }

    fn next_bool(&mut self) -> bool {
        self.next(1) != 0
    }

    fn consume_count(&mut self, count: usize) {
        for _ in 0..count {
            self.next(32);
        }
    }

    fn next_positional(&mut self) -> RandomSplitter {
        RandomSplitter::Legacy(LegacySplitter {
            seed: self.next_i64() as u64,
        })
    }
}

/// Positional factory for [`LegacyRandom`] streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacySplitter {
    seed: u64,
}

impl PositionalRandom for LegacySplitter {
    fn at(&self, x: i32, y: i32, z: i32) -> RandomSource {
        let seed = get_seed(x, y, z) as u64;
        RandomSource::Legacy(LegacyRandom::from_seed(seed ^ self.seed))
    }

    fn with_hash_of(&self, name: &str) -> RandomSource {
        let hash = i64::from(java_string_hash(name)) as u64;
        RandomSource::Legacy(LegacyRandom::from_seed(hash ^ self.seed))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, reason = "golden values are exact")]
mod tests {
    use super::*;

    #[test]
    fn test_next_i32() {
        let mut rng = LegacyRandom::from_seed(123);
        for value in [-1_188_957_731, 1_018_954_901, -39_088_943] {
            assert_eq!(rng.next_i32(), value);
        }
    }

    #[test]
    fn test_next_i32_bounded() {
        let mut rng = LegacyRandom::from_seed(123);
        assert_eq!(rng.next_i32_bounded(256), 185);
        assert_eq!(rng.next_i32_bounded(255), 200);
        assert_eq!(rng.next_i32_bounded(254), 74);
    }

    #[test]
    fn test_next_f64() {
        let mut rng = LegacyRandom::from_seed(123);
        assert_eq!(rng.next_f64(), 0.723_174_202_997_146_9);
        assert_eq!(rng.next_f64(), 0.990_898_896_777_239_3);
        assert_eq!(rng.next_f64(), 0.253_293_105_574_391_33);
    }

    #[test]
    fn test_next_i64_matches_java() {
        let mut rng = LegacyRandom::from_seed(0);
        assert_eq!(rng.next_i64(), -4_962_768_465_676_381_896);
    }

    #[test]
    fn test_java_string_hash() {
        assert_eq!(java_string_hash(""), 0);
        assert_eq!(java_string_hash("hello"), 99_162_322);
    }
}
