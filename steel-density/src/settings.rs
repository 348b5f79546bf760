//! Noise shape and generator settings.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::block::BlockStateId;
use crate::error::DensityError;
use crate::math::floor_div;
use crate::noise::NoiseParameters;
use crate::router::NoiseRouter;

/// Lowest Y a dimension may start at.
pub const MIN_BUILD_Y: i32 = -2032;
/// Highest Y a dimension may reach.
pub const MAX_BUILD_Y: i32 = 2031;
/// Largest dimension height.
pub const MAX_BUILD_HEIGHT: i32 = MAX_BUILD_Y - MIN_BUILD_Y + 1;

/// Vertical bounds and interpolation cell size.
///
/// Matches vanilla's `NoiseSettings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseSettings {
    /// Lowest generated block Y.
    pub min_y: i32,
    /// Number of generated layers.
    pub height: i32,
    /// Cell width in units of 4 blocks.
    pub size_horizontal: i32,
    /// Cell height in units of 4 blocks.
    pub size_vertical: i32,
}

impl NoiseSettings {
    /// Creates validated noise settings.
    ///
    /// # Errors
    /// Returns [`DensityError::InvalidSettings`] if `min_y` or `height` is not
    /// a multiple of 16, the range leaves the build limits, or a cell size is
    /// outside `1..=4`.
    pub fn new(min_y: i32, height: i32, size_horizontal: i32, size_vertical: i32) -> Result<Self, DensityError> {
        let settings = Self {
            min_y,
            height,
            size_horizontal,
            size_vertical,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks the build limits.
    ///
    /// # Errors
    /// See [`Self::new`].
    pub fn validate(&self) -> Result<(), DensityError> {
        if self.min_y % 16 != 0 {
            return Err(DensityError::InvalidSettings(format!(
                "min_y has to be a multiple of 16, got {}",
                self.min_y
            )));
        }
        if self.height % 16 != 0 || self.height <= 0 {
            return Err(DensityError::InvalidSettings(format!(
                "height has to be a positive multiple of 16, got {}",
                self.height
            )));
        }
        if self.min_y < MIN_BUILD_Y || self.min_y + self.height > MAX_BUILD_Y + 1 {
            return Err(DensityError::InvalidSettings(format!(
                "min_y + height cannot be higher than {}, got {}..{}",
                MAX_BUILD_Y + 1,
                self.min_y,
                self.min_y + self.height
            )));
        }
        for size in [self.size_horizontal, self.size_vertical] {
            if !(1..=4).contains(&size) {
                return Err(DensityError::InvalidSettings(format!(
                    "cell size has to be within 1..=4, got {size}"
                )));
            }
        }
        Ok(())
    }

    /// Blocks per cell along X and Z.
    #[must_use]
    pub const fn cell_width(&self) -> i32 {
        self.size_horizontal << 2
    }

    /// Blocks per cell along Y.
    #[must_use]
    pub const fn cell_height(&self) -> i32 {
        self.size_vertical << 2
    }

    /// Cells covering the full height.
    #[must_use]
    pub fn cell_count_y(&self) -> i32 {
        floor_div(self.height, self.cell_height())
    }

    /// The lowest cell Y.
    #[must_use]
    pub fn min_cell_y(&self) -> i32 {
        floor_div(self.min_y, self.cell_height())
    }

    /// Clips these settings to the height range of a chunk.
    ///
    /// # Errors
    /// See [`Self::new`].
    pub fn clamp_to_height(&self, min_y: i32, height: i32) -> Result<Self, DensityError> {
        let new_min = self.min_y.max(min_y);
        let new_max = (self.min_y + self.height).min(min_y + height);
        Self::new(new_min, new_max - new_min, self.size_horizontal, self.size_vertical)
    }
}

/// Everything needed to generate the noise stage of a dimension.
///
/// Matches vanilla's `NoiseGeneratorSettings`, minus surface rules and spawn
/// targets which belong to later stages.
#[derive(Debug, Clone)]
pub struct NoiseGeneratorSettings {
    /// Shape of the generated volume.
    pub noise: NoiseSettings,
    /// Block placed where density is positive.
    pub default_block: BlockStateId,
    /// Fluid placed below sea level where density is not positive.
    pub default_fluid: BlockStateId,
    /// Sea level.
    pub sea_level: i32,
    /// Whether ore veins replace solid blocks.
    pub ore_veins_enabled: bool,
    /// Whether streams use the legacy LCG, reproducing pre-overhaul seeds.
    pub use_legacy_random_source: bool,
    /// Unbound router template.
    pub noise_router: NoiseRouter,
    /// Noise parameters by key.
    pub noises: Arc<FxHashMap<String, NoiseParameters>>,
}

impl NoiseGeneratorSettings {
    /// Parameters registered for `key`.
    ///
    /// # Errors
    /// Returns [`DensityError::UnknownNoise`] if `key` is not registered.
    pub fn noise_parameters(&self, key: &str) -> Result<&NoiseParameters, DensityError> {
        self.noises
            .get(key)
            .ok_or_else(|| DensityError::UnknownNoise(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overworld_shape() {
        let settings = NoiseSettings::new(-64, 384, 1, 2).unwrap();
        assert_eq!(settings.cell_width(), 4);
        assert_eq!(settings.cell_height(), 8);
        assert_eq!(settings.cell_count_y(), 48);
        assert_eq!(settings.min_cell_y(), -8);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(NoiseSettings::new(-60, 384, 1, 2).is_err());
        assert!(NoiseSettings::new(-64, 380, 1, 2).is_err());
        assert!(NoiseSettings::new(0, 4096, 1, 2).is_err());
        assert!(NoiseSettings::new(0, 64, 0, 2).is_err());
        assert!(NoiseSettings::new(-2032, 4064, 4, 4).is_ok());
    }

    #[test]
    fn test_clamp_to_height() {
        let settings = NoiseSettings::new(-64, 384, 1, 2).unwrap();
        let clamped = settings.clamp_to_height(0, 256).unwrap();
        assert_eq!((clamped.min_y, clamped.height), (0, 256));
    }
}
