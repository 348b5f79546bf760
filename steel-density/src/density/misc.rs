//! Structural and miscellaneous density functions.

use std::sync::Arc;

use super::chunk::SampleOptions;
use super::noise::NoiseHolder;
use super::{ContextProvider, DagSampler, DensityStack, FunctionContext};
use crate::math::clamped_map;
use crate::noise::{END_ISLAND_MAX, END_ISLAND_MIN, EndIslands};

/// An indirection to another node.
///
/// Parents that share a sub-expression may point at it through a reference
/// instead of directly; either way the target is computed from one index.
/// Matches vanilla's `DensityFunctions.HolderHolder`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    /// The referenced node.
    pub target: usize,
    pub(crate) min_value: f64,
    pub(crate) max_value: f64,
}

impl Reference {
    pub(crate) const fn new(target: usize) -> Self {
        Self {
            target,
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
        }
    }
}

/// A Y-axis clamped gradient.
///
/// Returns `from_value` at Y = `from_y`, `to_value` at Y = `to_y`,
/// linearly interpolated between, clamped outside the range.
/// Matches vanilla's `DensityFunctions.YClampedGradient`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YClampedGradient {
    /// Starting Y coordinate
    pub from_y: i32,
    /// Ending Y coordinate
    pub to_y: i32,
    /// Value at `from_y`
    pub from_value: f64,
    /// Value at `to_y`
    pub to_value: f64,
}

impl YClampedGradient {
    #[inline]
    pub(crate) fn sample(&self, ctx: &FunctionContext) -> f64 {
        clamped_map(
            f64::from(ctx.block_y),
            f64::from(self.from_y),
            f64::from(self.to_y),
            self.from_value,
            self.to_value,
        )
    }

    pub(crate) fn range(&self) -> (f64, f64) {
        (
            self.from_value.min(self.to_value),
            self.from_value.max(self.to_value),
        )
    }
}

/// Choose between two functions based on input range.
///
/// Only the selected branch is evaluated.
/// Matches vanilla's `DensityFunctions.RangeChoice`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeChoice {
    /// Input node
    pub input: usize,
    /// Minimum inclusive bound
    pub min_inclusive: f64,
    /// Maximum exclusive bound
    pub max_exclusive: f64,
    /// Node used when in range
    pub when_in_range: usize,
    /// Node used when out of range
    pub when_out_of_range: usize,
    pub(crate) min_value: f64,
    pub(crate) max_value: f64,
}

impl RangeChoice {
    pub(crate) const fn new(
        input: usize,
        min_inclusive: f64,
        max_exclusive: f64,
        when_in_range: usize,
        when_out_of_range: usize,
    ) -> Self {
        Self {
            input,
            min_inclusive,
            max_exclusive,
            when_in_range,
            when_out_of_range,
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
        }
    }

    #[inline]
    fn branch(&self, value: f64) -> usize {
        if value >= self.min_inclusive && value < self.max_exclusive {
            self.when_in_range
        } else {
            self.when_out_of_range
        }
    }

    pub(crate) fn sample<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f64 {
        let value = stack.sample_at(self.input, ctx, options);
        stack.sample_at(self.branch(value), ctx, options)
    }

    pub(crate) fn fill<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        stack.fill_at(self.input, out, provider, options);
        for (index, value) in out.iter_mut().enumerate() {
            let ctx = provider.at(index, Some(options));
            *value = stack.sample_at(self.branch(*value), &ctx, options);
        }
    }

    pub(crate) fn update_range(&mut self, ranges: &DagSampler<'_>) {
        self.min_value = ranges
            .min_at(self.when_in_range)
            .min(ranges.min_at(self.when_out_of_range));
        self.max_value = ranges
            .max_at(self.when_in_range)
            .max(ranges.max_at(self.when_out_of_range));
    }
}

/// Rarity value mapper for cave generation.
///
/// The breakpoints are tuned data and must stay exactly as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RarityValueMapper {
    /// Mapper type `"type_1"` for tunnels.
    Tunnels,
    /// Mapper type `"type_2"` for caves.
    Caves,
}

impl RarityValueMapper {
    /// Get the scaling factor for this mapper based on rarity value.
    ///
    /// From vanilla NoiseRouterData.QuantizedSpaghettiRarity.
    #[must_use]
    pub fn get_values(&self, rarity: f64) -> f64 {
        match self {
            // Type 1: getSpaghettiRarity3D (tunnels)
            Self::Tunnels => {
                if rarity < -0.5 {
                    0.75
                } else if rarity < 0.0 {
                    1.0
                } else if rarity < 0.5 {
                    1.5
                } else {
                    2.0
                }
            }
            // Type 2: getSpaghettiRarity2D (caves)
            Self::Caves => {
                if rarity < -0.75 {
                    0.5
                } else if rarity < -0.5 {
                    0.75
                } else if rarity < 0.5 {
                    1.0
                } else if rarity < 0.75 {
                    2.0
                } else {
                    3.0
                }
            }
        }
    }

    /// Largest scale factor the mapper can return.
    #[must_use]
    pub const fn max_rarity(&self) -> f64 {
        match self {
            Self::Tunnels => 2.0,
            Self::Caves => 3.0,
        }
    }
}

/// Weird scaled sampler (for cave generation).
///
/// Matches vanilla's `DensityFunctions.WeirdScaledSampler`.
#[derive(Debug, Clone)]
pub struct WeirdScaledSampler {
    /// Input node supplying the rarity value
    pub input: usize,
    /// Noise sampled at the rescaled position
    pub noise: NoiseHolder,
    /// Rarity value mapper
    pub rarity_value_mapper: RarityValueMapper,
}

impl WeirdScaledSampler {
    pub(crate) fn sample<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f64 {
        let rarity = stack.sample_at(self.input, ctx, options);
        let scale = self.rarity_value_mapper.get_values(rarity);
        scale
            * self
                .noise
                .get_value(
                    f64::from(ctx.block_x) / scale,
                    f64::from(ctx.block_y) / scale,
                    f64::from(ctx.block_z) / scale,
                )
                .abs()
    }

    pub(crate) fn max_value(&self) -> f64 {
        self.rarity_value_mapper.max_rarity() * self.noise.max_value()
    }
}

/// End island height field.
///
/// The template instance is seeded with 0; seed binding replaces it with one
/// seeded from the world seed.
#[derive(Debug, Clone)]
pub struct EndIslandsFunction {
    /// The seeded island noise.
    pub islands: Arc<EndIslands>,
}

impl EndIslandsFunction {
    /// Island field for `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            islands: Arc::new(EndIslands::new(seed)),
        }
    }

    #[inline]
    pub(crate) fn sample(&self, ctx: &FunctionContext) -> f64 {
        self.islands.sample(ctx.block_x, ctx.block_z)
    }

    pub(crate) const fn range() -> (f64, f64) {
        (END_ISLAND_MIN, END_ISLAND_MAX)
    }
}

/// Blend alpha density function (1.0 when nothing is being blended).
///
/// Matches vanilla's `DensityFunctions.BlendAlpha`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendAlpha;

/// Blend offset density function (0.0 when nothing is being blended).
///
/// Matches vanilla's `DensityFunctions.BlendOffset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendOffset;

/// Blend density (for chunk blending).
///
/// Matches vanilla's `DensityFunctions.BlendDensity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendDensity {
    /// Input node
    pub input: usize,
}

/// The type of cache/marker wrapper.
///
/// Matches vanilla's `DensityFunctions.Marker.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerType {
    /// Evaluated at cell corners and trilinearly interpolated inside the cell.
    Interpolated,
    /// Prefilled per biome column of the chunk.
    FlatCache,
    /// Cache for the most recent (x, z) column.
    Cache2D,
    /// Cache the result for one evaluation.
    CacheOnce,
    /// Cache all values in a cell.
    CacheAllInCell,
}

/// A cache/marker wrapper density function.
///
/// Markers are pass-through outside a noise chunk.
/// Matches vanilla's `DensityFunctions.Marker`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// The marker type
    pub kind: MarkerType,
    /// The wrapped node
    pub wrapped: usize,
    pub(crate) min_value: f64,
    pub(crate) max_value: f64,
}

impl Marker {
    pub(crate) const fn new(kind: MarkerType, wrapped: usize) -> Self {
        Self {
            kind,
            wrapped,
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_value_mapper_tunnels() {
        let mapper = RarityValueMapper::Tunnels;
        assert!((mapper.get_values(-0.6) - 0.75).abs() < 0.01);
        assert!((mapper.get_values(-0.3) - 1.0).abs() < 0.01);
        assert!((mapper.get_values(0.0) - 1.5).abs() < 0.01);
        assert!((mapper.get_values(0.5) - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_rarity_value_mapper_caves() {
        let mapper = RarityValueMapper::Caves;
        assert!((mapper.get_values(-0.8) - 0.5).abs() < 0.01);
        assert!((mapper.get_values(-0.6) - 0.75).abs() < 0.01);
        assert!((mapper.get_values(0.0) - 1.0).abs() < 0.01);
        assert!((mapper.get_values(0.6) - 2.0).abs() < 0.01);
        assert!((mapper.get_values(0.75) - 3.0).abs() < 0.01);
    }

    #[test]
    fn test_gradient_clamps_outside() {
        let gradient = YClampedGradient {
            from_y: -64,
            to_y: 320,
            from_value: 1.5,
            to_value: -1.5,
        };
        assert!((gradient.sample(&FunctionContext::new(0, -100, 0)) - 1.5).abs() < 1e-12);
        assert!((gradient.sample(&FunctionContext::new(0, 400, 0)) + 1.5).abs() < 1e-12);
        assert!(gradient.sample(&FunctionContext::new(0, 128, 0)).abs() < 1e-12);
        assert_eq!(gradient.range(), (-1.5, 1.5));
    }
}
