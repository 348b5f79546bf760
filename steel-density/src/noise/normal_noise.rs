//! Double Perlin noise normalized to a target deviation, matching vanilla `NormalNoise`.

use crate::error::DensityError;
use crate::noise::{NoiseParameters, PerlinNoise};
use crate::random::{PositionalRandom, Random, RandomSplitter};

/// Scale applied to the second sampler's input.
pub const INPUT_FACTOR: f64 = 1.018_126_888_217_522_7;

const TARGET_DEVIATION: f64 = 1.0 / 6.0;

fn expected_deviation(octave_span: i32) -> f64 {
    0.1 * (1.0 + 1.0 / f64::from(octave_span.wrapping_add(1)))
}

/// Two Perlin samplers summed at slightly different frequencies.
#[derive(Debug, Clone)]
pub struct NormalNoise {
    first: PerlinNoise,
    second: PerlinNoise,
    value_factor: f64,
    max_value: f64,
}

impl NormalNoise {
    /// Instantiates the noise registered under `key`, seeded from `splitter`.
    #[must_use]
    pub fn create(splitter: &RandomSplitter, key: &str, parameters: &NoiseParameters) -> Self {
        Self::create_from_random(&mut splitter.with_hash_of(key), parameters)
    }

    /// Builds both samplers from consecutive positional splits of `random`.
    pub fn create_from_random<R: Random + ?Sized>(random: &mut R, parameters: &NoiseParameters) -> Self {
        let first = PerlinNoise::create(random, parameters.first_octave, &parameters.amplitudes);
        let second = PerlinNoise::create(random, parameters.first_octave, &parameters.amplitudes);
        Self::from_samplers(first, second, &parameters.amplitudes)
    }

    /// Builds both samplers with legacy sequential octave seeding, as the
    /// pre-overhaul temperature and vegetation noises were.
    pub fn create_legacy_nether_biome<R: Random + ?Sized>(
        random: &mut R,
        parameters: &NoiseParameters,
    ) -> Result<Self, DensityError> {
        let first = PerlinNoise::create_legacy(random, parameters.first_octave, &parameters.amplitudes)?;
        let second = PerlinNoise::create_legacy(random, parameters.first_octave, &parameters.amplitudes)?;
        Ok(Self::from_samplers(first, second, &parameters.amplitudes))
    }

    fn from_samplers(first: PerlinNoise, second: PerlinNoise, amplitudes: &[f64]) -> Self {
        let mut lowest = i32::MAX;
        let mut highest = i32::MIN;
        for (i, _) in amplitudes.iter().enumerate().filter(|(_, a)| **a != 0.0) {
            lowest = lowest.min(i as i32);
            highest = highest.max(i as i32);
        }
        // All-zero amplitudes leave the span at MIN - MAX, which wraps to 1.
        let value_factor = TARGET_DEVIATION / expected_deviation(highest.wrapping_sub(lowest));
        let max_value = (first.max_value() + second.max_value()) * value_factor;
        Self {
            first,
            second,
            value_factor,
            max_value,
        }
    }

    /// Samples the noise.
    #[inline]
    #[must_use]
    pub fn get_value(&self, x: f64, y: f64, z: f64) -> f64 {
        let shifted = self
            .second
            .get_value(x * INPUT_FACTOR, y * INPUT_FACTOR, z * INPUT_FACTOR);
        (self.first.get_value(x, y, z) + shifted) * self.value_factor
    }

    /// Bound on `|get_value|`.
    #[must_use]
    pub const fn max_value(&self) -> f64 {
        self.max_value
    }
}
