//! Floating island height field of the end dimension.
//!
//! Matches vanilla `EndIslandDensityFunction`: a distance falloff from the
//! origin combined with simplex-placed islands on a 25x25 chunk neighborhood.

use crate::noise::SimplexNoise;
use crate::random::Random;
use crate::random::legacy_random::LegacyRandom;

/// `-0.9F` promoted to double, which is not exactly `-0.9`.
const ISLAND_THRESHOLD: f64 = -0.9_f32 as f64;

/// Lowest value [`EndIslands::sample`] produces.
pub const MIN_VALUE: f64 = -0.843_75;
/// Highest value [`EndIslands::sample`] produces.
pub const MAX_VALUE: f64 = 0.5625;

/// Seeded island noise.
#[derive(Debug, Clone)]
pub struct EndIslands {
    island_noise: SimplexNoise,
}

impl EndIslands {
    /// Creates the island field for `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut random = LegacyRandom::from_seed(seed);
        random.consume_count(17_292);
        Self {
            island_noise: SimplexNoise::new(&mut random),
        }
    }

    /// Density at a block column, in `[MIN_VALUE, MAX_VALUE]`.
    #[must_use]
    pub fn sample(&self, block_x: i32, block_z: i32) -> f64 {
        (f64::from(self.height_value(block_x / 8, block_z / 8)) - 8.0) / 128.0
    }

    fn height_value(&self, section_x: i32, section_z: i32) -> f32 {
        let chunk_x = section_x / 2;
        let chunk_z = section_z / 2;
        let sub_x = section_x % 2;
        let sub_z = section_z % 2;

        let dist_sq = section_x
            .wrapping_mul(section_x)
            .wrapping_add(section_z.wrapping_mul(section_z));
        let mut height = (100.0_f32 - (dist_sq as f32).sqrt() * 8.0).clamp(-100.0, 80.0);

        for xo in -12..=12 {
            for zo in -12..=12 {
                let cx = i64::from(chunk_x) + i64::from(xo);
                let cz = i64::from(chunk_z) + i64::from(zo);
                if cx * cx + cz * cz <= 4096
                    || self.island_noise.get_value_2d(cx as f64, cz as f64) >= ISLAND_THRESHOLD
                {
                    continue;
                }
                let size = ((cx as f32).abs() * 3439.0 + (cz as f32).abs() * 147.0) % 13.0 + 9.0;
                let dx = (sub_x - xo * 2) as f32;
                let dz = (sub_z - zo * 2) as f32;
                let island = (100.0_f32 - (dx * dx + dz * dz).sqrt() * size).clamp(-100.0, 80.0);
                height = height.max(island);
            }
        }

        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_island_is_solid() {
        let islands = EndIslands::new(0);
        let v = islands.sample(0, 0);
        assert!((v - (80.0 - 8.0) / 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_far_void_is_bounded() {
        let islands = EndIslands::new(1);
        for (x, z) in [(5000, 0), (-4000, 7000), (12_345, -9_876)] {
            let v = islands.sample(x, z);
            assert!((MIN_VALUE..=MAX_VALUE).contains(&v), "{v} at {x},{z}");
        }
    }
}
