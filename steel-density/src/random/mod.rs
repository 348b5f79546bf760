//! Deterministic random streams used by world generation.
//!
//! Two generator families exist, both bit-compatible with vanilla:
//!
//! - [`xoroshiro::Xoroshiro`] - Xoroshiro128++ used by modern worlds
//! - [`legacy_random::LegacyRandom`] - the 48-bit LCG used by pre-overhaul seeds
//!
//! Every generator can split into a [`RandomSplitter`], a positional factory that
//! derives an independent stream from a block position or a name without
//! advancing any shared state.

pub mod legacy_random;
pub mod worldgen_random;
pub mod xoroshiro;

use legacy_random::{LegacyRandom, LegacySplitter};
use xoroshiro::{Xoroshiro, XoroshiroSplitter};

/// A pseudo-random number stream.
pub trait Random {
    /// Reseeds the stream in place.
    fn set_seed(&mut self, seed: u64);

    /// Returns the next uniformly distributed `i32`.
    fn next_i32(&mut self) -> i32;

    /// Returns a value in `0..bound`. `bound` must be positive.
    fn next_i32_bounded(&mut self, bound: i32) -> i32;

    /// Returns a value in `min..=max`.
    fn next_i32_between(&mut self, min: i32, max: i32) -> i32 {
        self.next_i32_bounded(max - min + 1) + min
    }

    /// Returns the next uniformly distributed `i64`.
    fn next_i64(&mut self) -> i64;

    /// Returns the next `f32` in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Returns the next `f64` in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Returns the next boolean.
    fn next_bool(&mut self) -> bool;

    /// Advances the stream by `count` draws.
    fn consume_count(&mut self, count: usize);

    /// Splits off a positional factory, consuming state from this stream.
    fn next_positional(&mut self) -> RandomSplitter;
}

/// A factory deriving independent streams from positions or names.
pub trait PositionalRandom {
    /// Derives the stream for a block position.
    fn at(&self, x: i32, y: i32, z: i32) -> RandomSource;

    /// Derives the stream for a name such as `minecraft:aquifer`.
    fn with_hash_of(&self, name: &str) -> RandomSource;
}

/// Either of the two generator families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RandomSource {
    /// Xoroshiro128++ stream.
    Xoroshiro(Xoroshiro),
    /// Legacy LCG stream.
    Legacy(LegacyRandom),
}

impl RandomSource {
    /// Creates a stream of the requested family.
    #[must_use]
    pub const fn new(seed: u64, legacy: bool) -> Self {
        if legacy {
            Self::Legacy(LegacyRandom::from_seed(seed))
        } else {
            Self::Xoroshiro(Xoroshiro::from_seed(seed))
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Self::Xoroshiro($inner) => $body,
            Self::Legacy($inner) => $body,
        }
    };
}

impl Random for RandomSource {
    fn set_seed(&mut self, seed: u64) {
        dispatch!(self, r => r.set_seed(seed));
    }

    fn next_i32(&mut self) -> i32 {
        dispatch!(self, r => r.next_i32())
    }

    fn next_i32_bounded(&mut self, bound: i32) -> i32 {
        dispatch!(self, r => r.next_i32_bounded(bound))
    }

    fn next_i64(&mut self) -> i64 {
        dispatch!(self, r => r.next_i64())
    }

    fn next_f32(&mut self) -> f32 {
        dispatch!(self, r => r.next_f32())
    }

    fn next_f64(&mut self) -> f64 {
        dispatch!(self, r => r.next_f64())
    }

    fn next_bool(&mut self) -> bool {
        dispatch!(self, r => r.next_bool())
    }

    fn consume_count(&mut self, count: usize) {
        dispatch!(self, r => r.consume_count(count));
    }

    fn next_positional(&mut self) -> RandomSplitter {
        dispatch!(self, r => r.next_positional())
    }
}

/// Either of the two positional factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomSplitter {
    /// Factory producing Xoroshiro streams.
    Xoroshiro(XoroshiroSplitter),
    /// Factory producing legacy streams.
    Legacy(LegacySplitter),
}

impl PositionalRandom for RandomSplitter {
    fn at(&self, x: i32, y: i32, z: i32) -> RandomSource {
        dispatch!(self, s => s.at(x, y, z))
    }

    fn with_hash_of(&self, name: &str) -> RandomSource {
        dispatch!(self, s => s.with_hash_of(name))
    }
}

/// Hashes a block position into a seed, matching vanilla `Mth.getSeed`.
#[must_use]
pub const fn get_seed(x: i32, y: i32, z: i32) -> i64 {
    let mut l = (x.wrapping_mul(3_129_871) as i64)
        ^ (z as i64).wrapping_mul(116_129_781)
        ^ (y as i64);
    l = l
        .wrapping_mul(l)
        .wrapping_mul(42_317_861)
        .wrapping_add(l.wrapping_mul(11));
    l >> 16
}
