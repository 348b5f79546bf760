//! Seed derivations for decoration and feature placement.
//!
//! These reseed an underlying stream with formulas that must match vanilla
//! `WorldgenRandom` bit-for-bit, or regenerated chunks drift from saved ones.

use crate::random::{PositionalRandom, Random, RandomSource, RandomSplitter};

/// A reseedable stream with vanilla's decoration and feature seed helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldgenRandom {
    source: RandomSource,
}

impl WorldgenRandom {
    /// Wraps an existing stream.
    #[must_use]
    pub const fn new(source: RandomSource) -> Self {
        Self { source }
    }

    /// Seeds the stream for decorating the chunk whose minimum block is
    /// `(min_block_x, min_block_z)` and returns the derived decoration seed.
    pub fn set_decoration_seed(&mut self, level_seed: i64, min_block_x: i32, min_block_z: i32) -> i64 {
        self.source.set_seed(level_seed as u64);
        let i = self.source.next_i64() | 1;
        let j = self.source.next_i64() | 1;
        let seed = i64::from(min_block_x)
            .wrapping_mul(i)
            .wrapping_add(i64::from(min_block_z).wrapping_mul(j))
            ^ level_seed;
        self.source.set_seed(seed as u64);
        seed
    }

    /// Seeds the stream for one feature of one decoration step.
    pub fn set_feature_seed(&mut self, decoration_seed: i64, index: i32, step: i32) {
        let offset = i64::from(index) + i64::from(step.wrapping_mul(10_000));
        self.source.set_seed(decoration_seed.wrapping_add(offset) as u64);
    }

    /// Seeds the stream for a large feature (carver, structure start) in a chunk.
    pub fn set_large_feature_seed(&mut self, base_seed: i64, chunk_x: i32, chunk_z: i32) {
        self.source.set_seed(base_seed as u64);
        let i = self.source.next_i64();
        let j = self.source.next_i64();
        let seed = i64::from(chunk_x).wrapping_mul(i) ^ i64::from(chunk_z).wrapping_mul(j) ^ base_seed;
        self.source.set_seed(seed as u64);
    }

    /// Seeds the stream for a salted structure region.
    pub fn set_large_feature_with_salt(&mut self, level_seed: i64, region_x: i32, region_z: i32, salt: i32) {
        let seed = i64::from(region_x)
            .wrapping_mul(341_873_128_712)
            .wrapping_add(i64::from(region_z).wrapping_mul(132_897_987_541))
            .wrapping_add(level_seed)
            .wrapping_add(i64::from(salt));
        self.source.set_seed(seed as u64);
    }
}

impl Random for WorldgenRandom {
    fn set_seed(&mut self, seed: u64) {
        self.source.set_seed(seed);
    }

    fn next_i32(&mut self) -> i32 {
        self.source.next_i32()
    }

    fn next_i32_bounded(&mut self, bound: i32) -> i32 {
        self.source.next_i32_bounded(bound)
    }

    fn next_i64(&mut self) -> i64 {
        self.source.next_i64()
    }

    fn next_f32(&mut self) -> f32 {
        self.source.next_f32()
    }

    fn next_f64(&mut self) -> f64 {
        self.source.next_f64()
    }

    fn next_bool(&mut self) -> bool {
        self.source.next_bool()
    }

    fn consume_count(&mut self, count: usize) {
        self.source.consume_count(count);
    }

    fn next_positional(&mut self) -> RandomSplitter {
        self.source.next_positional()
    }
}

/// Derives the positional stream for a named feature, keyed like vanilla
/// `RandomState.getOrCreateRandomFactory`.
#[must_use]
pub fn feature_random(splitter: &RandomSplitter, name: &str) -> WorldgenRandom {
    WorldgenRandom::new(splitter.with_hash_of(name))
}
