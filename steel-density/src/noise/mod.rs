//! Noise generation primitives matching vanilla's noise system.
//!
//! - [`ImprovedNoise`] - single octave gradient noise
//! - [`PerlinNoise`] - octave stack, modern or legacy seeded
//! - [`NormalNoise`] - double Perlin noise used by most router inputs
//! - [`SimplexNoise`] - simplex noise used by [`EndIslands`]
//! - [`BlendedNoise`] - base 3-D terrain noise

mod blended_noise;
mod end_islands;
mod improved_noise;
mod normal_noise;
mod perlin_noise;
mod simplex_noise;

use serde::{Deserialize, Serialize};

pub use blended_noise::{BlendedNoise, BlendedNoiseParameters};
pub use end_islands::{EndIslands, MAX_VALUE as END_ISLAND_MAX, MIN_VALUE as END_ISLAND_MIN};
pub use improved_noise::ImprovedNoise;
pub use normal_noise::NormalNoise;
pub use perlin_noise::{PerlinNoise, wrap};
pub use simplex_noise::SimplexNoise;

/// Gradient vectors shared by gradient and simplex noise.
pub(crate) const GRADIENT: [[i32; 3]; 16] = [
    [1, 1, 0],
    [-1, 1, 0],
    [1, -1, 0],
    [-1, -1, 0],
    [1, 0, 1],
    [-1, 0, 1],
    [1, 0, -1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, -1, 1],
    [0, 1, -1],
    [0, -1, -1],
    [1, 1, 0],
    [0, -1, 1],
    [-1, 1, 0],
    [0, -1, -1],
];

/// Octave layout of a [`NormalNoise`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParameters {
    /// Octave of the first amplitude; negative means lower frequency.
    pub first_octave: i32,
    /// Per-octave amplitudes, zero entries are skipped.
    pub amplitudes: Vec<f64>,
}

impl NoiseParameters {
    /// Creates noise parameters.
    #[must_use]
    pub const fn new(first_octave: i32, amplitudes: Vec<f64>) -> Self {
        Self {
            first_octave,
            amplitudes,
        }
    }
}
