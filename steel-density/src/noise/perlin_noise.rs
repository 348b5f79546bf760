//! Octave-summed gradient noise, matching vanilla `PerlinNoise`.

use crate::error::DensityError;
use crate::noise::ImprovedNoise;
use crate::random::{PositionalRandom, Random};

const ROUND_OFF: f64 = 33_554_432.0;

/// Draws consumed by an octave that is skipped during legacy construction.
const SKIPPED_OCTAVE_DRAWS: usize = 262;

/// Keeps coordinates in a range where `f64` still resolves fractions.
#[inline]
#[must_use]
pub fn wrap(value: f64) -> f64 {
    value - (value / ROUND_OFF + 0.5).floor() * ROUND_OFF
}

/// A stack of [`ImprovedNoise`] octaves with per-octave amplitudes.
///
/// Index 0 is the lowest frequency octave.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    noise_levels: Vec<Option<ImprovedNoise>>,
    amplitudes: Vec<f64>,
    lowest_freq_input_factor: f64,
    lowest_freq_value_factor: f64,
    max_value: f64,
}

impl PerlinNoise {
    /// Builds octaves from a positional split of `random`, one name per octave.
    pub fn create<R: Random + ?Sized>(random: &mut R, first_octave: i32, amplitudes: &[f64]) -> Self {
        let splitter = random.next_positional();
        let noise_levels = amplitudes
            .iter()
            .enumerate()
            .map(|(i, &amplitude)| {
                (amplitude != 0.0).then(|| {
                    let octave = first_octave + i as i32;
                    ImprovedNoise::new(&mut splitter.with_hash_of(&format!("octave_{octave}")))
                })
            })
            .collect();
        Self::from_parts(noise_levels, amplitudes, first_octave)
    }

    /// Builds octaves by drawing sequentially from `random`, highest octave first.
    ///
    /// This is how pre-overhaul generators were seeded. Octaves above zero are
    /// not supported.
    pub fn create_legacy<R: Random + ?Sized>(
        random: &mut R,
        first_octave: i32,
        amplitudes: &[f64],
    ) -> Result<Self, DensityError> {
        let octaves = amplitudes.len() as i32;
        let zero_octave = -first_octave;
        let mut noise_levels: Vec<Option<ImprovedNoise>> = vec![None; amplitudes.len()];

        let top = ImprovedNoise::new(random);
        if (0..octaves).contains(&zero_octave) && amplitudes[zero_octave as usize] != 0.0 {
            noise_levels[zero_octave as usize] = Some(top);
        }
        for index in (0..zero_octave).rev() {
            if index < octaves && amplitudes[index as usize] != 0.0 {
                noise_levels[index as usize] = Some(ImprovedNoise::new(random));
            } else {
                random.consume_count(SKIPPED_OCTAVE_DRAWS);
            }
        }

        let built = noise_levels.iter().filter(|level| level.is_some()).count();
        let expected = amplitudes.iter().filter(|&&a| a != 0.0).count();
        if built != expected {
            return Err(DensityError::InvalidNoiseParameters(
                "failed to create correct number of noise levels for given non-zero amplitudes",
            ));
        }
        if zero_octave < octaves - 1 {
            return Err(DensityError::InvalidNoiseParameters(
                "positive octaves are not supported by legacy noise",
            ));
        }

        Ok(Self::from_parts(noise_levels, amplitudes, first_octave))
    }

    fn from_parts(noise_levels: Vec<Option<ImprovedNoise>>, amplitudes: &[f64], first_octave: i32) -> Self {
        let octaves = amplitudes.len() as i32;
        let lowest_freq_value_factor = 2.0_f64.powi(octaves - 1) / (2.0_f64.powi(octaves) - 1.0);
        let mut noise = Self {
            noise_levels,
            amplitudes: amplitudes.to_vec(),
            lowest_freq_input_factor: 2.0_f64.powi(first_octave),
            lowest_freq_value_factor,
            max_value: 0.0,
        };
        noise.max_value = noise.edge_value(2.0);
        noise
    }

    /// Sum of `|amplitude| * value` over present octaves.
    #[must_use]
    pub fn edge_value(&self, value: f64) -> f64 {
        let mut total = 0.0;
        let mut value_factor = self.lowest_freq_value_factor;
        for (level, amplitude) in self.noise_levels.iter().zip(&self.amplitudes) {
            if level.is_some() {
                total += amplitude * value * value_factor;
            }
            value_factor /= 2.0;
        }
        total
    }

    /// Upper bound used when octaves are sampled with vertical quantization.
    #[must_use]
    pub fn max_broken_value(&self, y_multiplier: f64) -> f64 {
        self.edge_value(y_multiplier + 2.0)
    }

    /// Samples all octaves.
    #[inline]
    #[must_use]
    pub fn get_value(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut value = 0.0;
        let mut input_factor = self.lowest_freq_input_factor;
        let mut value_factor = self.lowest_freq_value_factor;
        for (level, amplitude) in self.noise_levels.iter().zip(&self.amplitudes) {
            if let Some(noise) = level {
                let sample = noise.noise(
                    wrap(x * input_factor),
                    wrap(y * input_factor),
                    wrap(z * input_factor),
                );
                value += amplitude * sample * value_factor;
            }
            input_factor *= 2.0;
            value_factor /= 2.0;
        }
        value
    }

    /// Octave `i` counted from the highest frequency.
    #[must_use]
    pub fn get_octave_noise(&self, i: usize) -> Option<&ImprovedNoise> {
        let len = self.noise_levels.len();
        if i >= len {
            return None;
        }
        self.noise_levels[len - 1 - i].as_ref()
    }

    /// Bound on `|get_value|`.
    #[must_use]
    pub const fn max_value(&self) -> f64 {
        self.max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomSource;

    #[test]
    fn test_wrap() {
        assert!((wrap(100.0) - 100.0).abs() < 1e-10);
        assert!((wrap(-100.0) + 100.0).abs() < 1e-10);
        assert!(wrap(ROUND_OFF * 3.0 + 1.0).abs() < 2.0);
    }

    #[test]
    fn test_create_consumes_positional_split() {
        let mut random = RandomSource::new(12345, false);
        let first = PerlinNoise::create(&mut random, -3, &[1.0, 1.0, 1.0]);
        let second = PerlinNoise::create(&mut random, -3, &[1.0, 1.0, 1.0]);
        let v1 = first.get_value(100.0, 64.0, 100.0);
        let v2 = second.get_value(100.0, 64.0, 100.0);
        assert!((v1 - v2).abs() > 1e-6);
    }

    #[test]
    fn test_legacy_rejects_positive_octaves() {
        let mut random = RandomSource::new(1, true);
        let result = PerlinNoise::create_legacy(&mut random, 0, &[1.0, 1.0]);
        assert!(matches!(result, Err(DensityError::InvalidNoiseParameters(_))));
    }

    #[test]
    fn test_legacy_octave_order() {
        let mut random = RandomSource::new(5, true);
        let noise = PerlinNoise::create_legacy(&mut random, -7, &[1.0; 8]).expect("valid octaves");
        assert!(noise.get_octave_noise(0).is_some());
        assert!(noise.get_octave_noise(7).is_some());
        assert!(noise.get_octave_noise(8).is_none());
    }

    #[test]
    fn test_max_value_bounds_samples() {
        let mut random = RandomSource::new(77, false);
        let noise = PerlinNoise::create(&mut random, -4, &[1.0, 0.5, 0.0, 2.0]);
        for i in 0..200 {
            let t = f64::from(i);
            let v = noise.get_value(t * 7.3, t * 1.9, -t * 5.1);
            assert!(v.abs() <= noise.max_value());
        }
    }
}
