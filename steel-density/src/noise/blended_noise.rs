//! Base 3-D terrain noise, matching vanilla `BlendedNoise`.
//!
//! A low-resolution selector noise blends between two limit noises. All three
//! are built with legacy sequential octave seeding, regardless of whether the
//! world uses legacy random streams.

use crate::error::DensityError;
use crate::math::clamped_lerp;
use crate::noise::{PerlinNoise, wrap};
use crate::random::Random;

const COORDINATE_SCALE: f64 = 684.412;
const LIMIT_OCTAVES: usize = 16;
const MAIN_OCTAVES: usize = 8;

/// Shape parameters of a [`BlendedNoise`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendedNoiseParameters {
    /// Horizontal coordinate scale.
    pub xz_scale: f64,
    /// Vertical coordinate scale.
    pub y_scale: f64,
    /// Horizontal selector divisor.
    pub xz_factor: f64,
    /// Vertical selector divisor.
    pub y_factor: f64,
    /// Vertical smear of the limit noises.
    pub smear_scale_multiplier: f64,
}

impl BlendedNoiseParameters {
    const fn y_multiplier(&self) -> f64 {
        COORDINATE_SCALE * self.y_scale
    }

    /// Upper bound on the absolute output for these parameters.
    ///
    /// This is seed independent, so unbound templates report the same range.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        let octaves = LIMIT_OCTAVES as i32;
        let mut value_factor = 2.0_f64.powi(octaves - 1) / (2.0_f64.powi(octaves) - 1.0);
        let mut total = 0.0;
        for _ in 0..LIMIT_OCTAVES {
            total += (self.y_multiplier() + 2.0) * value_factor;
            value_factor /= 2.0;
        }
        total
    }
}

/// Seeded blended noise.
#[derive(Debug, Clone)]
pub struct BlendedNoise {
    min_limit: PerlinNoise,
    max_limit: PerlinNoise,
    main: PerlinNoise,
    parameters: BlendedNoiseParameters,
    xz_multiplier: f64,
    y_multiplier: f64,
    max_value: f64,
}

impl BlendedNoise {
    /// Seeds the three octave stacks from `random`.
    pub fn new<R: Random + ?Sized>(random: &mut R, parameters: BlendedNoiseParameters) -> Result<Self, DensityError> {
        let min_limit = PerlinNoise::create_legacy(random, -15, &[1.0; LIMIT_OCTAVES])?;
        let max_limit = PerlinNoise::create_legacy(random, -15, &[1.0; LIMIT_OCTAVES])?;
        let main = PerlinNoise::create_legacy(random, -7, &[1.0; MAIN_OCTAVES])?;
        let y_multiplier = parameters.y_multiplier();
        let max_value = min_limit.max_broken_value(y_multiplier);
        Ok(Self {
            min_limit,
            max_limit,
            main,
            parameters,
            xz_multiplier: COORDINATE_SCALE * parameters.xz_scale,
            y_multiplier,
            max_value,
        })
    }

    /// The shape parameters this noise was built with.
    #[must_use]
    pub const fn parameters(&self) -> &BlendedNoiseParameters {
        &self.parameters
    }

    /// Bound on the absolute output.
    #[must_use]
    pub const fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Samples at a block position.
    #[must_use]
    #[expect(clippy::similar_names, reason = "mirrors the three axis pipelines")]
    pub fn sample(&self, block_x: i32, block_y: i32, block_z: i32) -> f64 {
        let x = f64::from(block_x) * self.xz_multiplier;
        let y = f64::from(block_y) * self.y_multiplier;
        let z = f64::from(block_z) * self.xz_multiplier;
        let sel_x = x / self.parameters.xz_factor;
        let sel_y = y / self.parameters.y_factor;
        let sel_z = z / self.parameters.xz_factor;
        let smear = self.y_multiplier * self.parameters.smear_scale_multiplier;
        let sel_smear = smear / self.parameters.y_factor;

        let mut selector = 0.0;
        let mut scale = 1.0;
        for octave in 0..MAIN_OCTAVES {
            if let Some(noise) = self.main.get_octave_noise(octave) {
                selector += noise.noise_with_y_scale(
                    wrap(sel_x * scale),
                    wrap(sel_y * scale),
                    wrap(sel_z * scale),
                    sel_smear * scale,
                    sel_y * scale,
                ) / scale;
            }
            scale /= 2.0;
        }

        let delta = (selector / 10.0 + 1.0) / 2.0;
        let only_max = delta >= 1.0;
        let only_min = delta <= 0.0;

        let mut min_total = 0.0;
        let mut max_total = 0.0;
        let mut scale = 1.0;
        for octave in 0..LIMIT_OCTAVES {
            let (wx, wy, wz) = (wrap(x * scale), wrap(y * scale), wrap(z * scale));
            let y_scale = smear * scale;
            if !only_max && let Some(noise) = self.min_limit.get_octave_noise(octave) {
                min_total += noise.noise_with_y_scale(wx, wy, wz, y_scale, y * scale) / scale;
            }
            if !only_min && let Some(noise) = self.max_limit.get_octave_noise(octave) {
                max_total += noise.noise_with_y_scale(wx, wy, wz, y_scale, y * scale) / scale;
            }
            scale /= 2.0;
        }

        clamped_lerp(min_total / 512.0, max_total / 512.0, delta) / 128.0
    }
}
