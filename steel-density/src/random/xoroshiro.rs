//! Xoroshiro128++ random stream, matching vanilla `XoroshiroRandomSource`.

use crate::random::{PositionalRandom, Random, RandomSource, RandomSplitter, get_seed};

const SILVER_RATIO_64: u64 = 0x6a09_e667_f3bc_c909;
const GOLDEN_RATIO_64: u64 = 0x9e37_79b9_7f4a_7c15;
const STAFFORD_1: u64 = 0xbf58_476d_1ce4_e5b9;
const STAFFORD_2: u64 = 0x94d0_49bb_1331_11eb;

const FLOAT_UNIT: f32 = 1.0 / (1u32 << 24) as f32;
const DOUBLE_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

const fn mix_stafford_13(mut value: u64) -> u64 {
    value = (value ^ (value >> 30)).wrapping_mul(STAFFORD_1);
    value = (value ^ (value >> 27)).wrapping_mul(STAFFORD_2);
    value ^ (value >> 31)
}

const fn upgrade_seed(seed: u64) -> (u64, u64) {
    let lo = seed ^ SILVER_RATIO_64;
    let hi = lo.wrapping_add(GOLDEN_RATIO_64);
    (mix_stafford_13(lo), mix_stafford_13(hi))
}

/// Xoroshiro128++ generator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xoroshiro {
    lo: u64,
    hi: u64,
}

impl Xoroshiro {
    /// Creates a generator from a 64-bit seed using the Stafford-13 upgrade.
    #[must_use]
    pub const fn from_seed(seed: u64) -> Self {
        let (lo, hi) = upgrade_seed(seed);
        Self::new(lo, hi)
    }

    /// Creates a generator from raw 128-bit state.
    ///
    /// An all-zero state is replaced by vanilla's fixed fallback.
    #[must_use]
    pub const fn new(lo: u64, hi: u64) -> Self {
        if lo | hi == 0 {
            Self {
                lo: -7_046_029_254_386_353_131_i64 as u64,
                hi: 7_640_891_576_956_012_809,
            }
        } else {
            Self { lo, hi }
        }
    }

    #[inline]
    const fn next(&mut self) -> u64 {
        let l = self.lo;
        let mut m = self.hi;
        let n = l.wrapping_add(m).rotate_left(17).wrapping_add(l);
        m ^= l;
        self.lo = l.rotate_left(49) ^ m ^ (m << 21);
        self.hi = m.rotate_left(28);
        n
    }

    #[inline]
    const fn next_bits(&mut self, bits: u32) -> u64 {
        self.next() >> (64 - bits)
    }
}

impl Random for Xoroshiro {
    fn set_seed(&mut self, seed: u64) {
        *self = Self::from_seed(seed);
    }

    #[inline]
    fn next_i32(&mut self) -> i32 {
        self.next() as i32
    }

    fn next_i32_bounded(&mut self, bound: i32) -> i32 {
        debug_assert!(bound > 0, "bound must be positive");
        let bound = bound as u32;
        let mut product = u64::from(self.next_i32() as u32).wrapping_mul(u64::from(bound));
        let mut low = product as u32;
        if low < bound {
            let threshold = (!bound).wrapping_add(1) % bound;
            while low < threshold {
                product = u64::from(self.next_i32() as u32).wrapping_mul(u64::from(bound));
                low = product as u32;
            }
        }
        (product >> 32) as i32
    }

    #[inline]
    fn next_i64(&mut self) -> i64 {
        self.next() as i64
    }

    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.next_bits(24) as f32 * FLOAT_UNIT
    }

    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.next_bits(53) as f64 * DOUBLE_UNIT
    }

    fn next_bool(&mut self) -> bool {
        self.next() & 1 != 0
    }

    fn consume_count(&mut self, count: usize) {
        for _ in 0..count {
            self.next();
        }
    }

    fn next_positional(&mut self) -> RandomSplitter {
        let lo = self.next();
        let hi = self.next();
        RandomSplitter::Xoroshiro(XoroshiroSplitter { lo, hi })
    }
}

/// Positional factory for [`Xoroshiro`] streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XoroshiroSplitter {
    lo: u64,
    hi: u64,
}

impl PositionalRandom for XoroshiroSplitter {
    fn at(&self, x: i32, y: i32, z: i32) -> RandomSource {
        let seed = get_seed(x, y, z) as u64;
        RandomSource::Xoroshiro(Xoroshiro::new(seed ^ self.lo, self.hi))
    }

    fn with_hash_of(&self, name: &str) -> RandomSource {
        let digest = md5::compute(name.as_bytes()).0;
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&digest[..8]);
        hi.copy_from_slice(&digest[8..]);
        RandomSource::Xoroshiro(Xoroshiro::new(
            u64::from_be_bytes(lo) ^ self.lo,
            u64::from_be_bytes(hi) ^ self.hi,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, reason = "golden values are exact")]
mod tests {
    use super::*;

    #[test]
    fn test_next_i64() {
        let mut rng = Xoroshiro::from_seed(1);
        let expected = [
            -1_033_667_707_219_518_978,
            6_451_672_561_743_293_322,
            -1_821_890_263_888_393_630,
        ];
        for value in expected {
            assert_eq!(rng.next_i64(), value);
        }
    }

    #[test]
    fn test_next_i32() {
        let mut rng = Xoroshiro::from_seed(1);
        for value in [1_734_564_350, 836_234_122, 825_264_738] {
            assert_eq!(rng.next_i32(), value);
        }
    }

    #[test]
    fn test_next_i32_bounded() {
        let mut rng = Xoroshiro::from_seed(1);
        assert_eq!(rng.next_i32_bounded(25), 10);
        assert_eq!(rng.next_i32_bounded(256), 49);
        assert_eq!(rng.next_i32_bounded(255), 48);
        assert_eq!(rng.next_i32_bounded(254), 169);
        assert_eq!(rng.next_i32_bounded(0x7fff_ffff), 383_715_241);
    }

    #[test]
    fn test_next_f64() {
        let mut rng = Xoroshiro::from_seed(1);
        assert_eq!(rng.next_f64(), 0.943_964_761_310_224_3);
        assert_eq!(rng.next_f64(), 0.349_745_870_380_359_87);
        assert_eq!(rng.next_f64(), 0.901_235_130_893_100_7);
    }

    #[test]
    fn test_next_f32() {
        let mut rng = Xoroshiro::from_seed(1);
        assert_eq!(rng.next_f32(), 0.943_964_7);
        assert_eq!(rng.next_f32(), 0.349_745_87);
    }

    #[test]
    fn test_zero_state_fallback() {
        let mut zero = Xoroshiro::new(0, 0);
        let mut fallback = Xoroshiro::new(
            -7_046_029_254_386_353_131_i64 as u64,
            7_640_891_576_956_012_809,
        );
        assert_eq!(zero.next_i64(), fallback.next_i64());
    }

    #[test]
    fn test_set_seed_restarts_stream() {
        let mut rng = Xoroshiro::from_seed(99);
        let first = rng.next_i64();
        rng.consume_count(5);
        rng.set_seed(99);
        assert_eq!(rng.next_i64(), first);
    }
}
