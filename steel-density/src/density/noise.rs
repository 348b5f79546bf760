//! Noise-sampling density functions.

use std::sync::Arc;

use super::chunk::SampleOptions;
use super::{DensityStack, FunctionContext};
use crate::noise::{BlendedNoise, BlendedNoiseParameters, NormalNoise};

/// Bound used for an unbound holder, matching vanilla's `NoiseHolder`.
const UNBOUND_MAX_VALUE: f64 = 2.0;

/// A named noise key plus the seeded instance bound to it.
///
/// Templates carry unbound holders, which sample 0. Seed binding fills the
/// instance and it stays fixed for the lifetime of that seed.
#[derive(Debug, Clone)]
pub struct NoiseHolder {
    /// Noise parameter key, e.g. `minecraft:continentalness`.
    pub key: String,
    /// Seeded noise, `None` before binding.
    pub noise: Option<Arc<NormalNoise>>,
}

impl NoiseHolder {
    /// An unbound holder for `key`.
    #[must_use]
    pub fn unbound(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            noise: None,
        }
    }

    /// A holder bound to `noise`.
    #[must_use]
    pub fn bound(key: impl Into<String>, noise: Arc<NormalNoise>) -> Self {
        Self {
            key: key.into(),
            noise: Some(noise),
        }
    }

    /// Whether a seeded instance is attached.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.noise.is_some()
    }

    /// Samples the bound noise, or 0 when unbound.
    #[inline]
    #[must_use]
    pub fn get_value(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise.as_ref().map_or(0.0, |noise| noise.get_value(x, y, z))
    }

    /// Bound on `|get_value|`.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.noise.as_ref().map_or(UNBOUND_MAX_VALUE, |noise| noise.max_value())
    }
}

/// Sample from a noise generator.
///
/// Matches vanilla's `DensityFunctions.Noise`.
#[derive(Debug, Clone)]
pub struct Noise {
    /// The sampled noise
    pub noise: NoiseHolder,
    /// XZ scale factor
    pub xz_scale: f64,
    /// Y scale factor
    pub y_scale: f64,
}

impl Noise {
    #[inline]
    pub(crate) fn sample(&self, ctx: &FunctionContext) -> f64 {
        self.noise.get_value(
            f64::from(ctx.block_x) * self.xz_scale,
            f64::from(ctx.block_y) * self.y_scale,
            f64::from(ctx.block_z) * self.xz_scale,
        )
    }
}

/// Sample from a noise generator at child-shifted coordinates.
///
/// Matches vanilla's `DensityFunctions.ShiftedNoise`.
#[derive(Debug, Clone)]
pub struct ShiftedNoise {
    /// X coordinate shift
    pub shift_x: usize,
    /// Y coordinate shift
    pub shift_y: usize,
    /// Z coordinate shift
    pub shift_z: usize,
    /// XZ scale factor
    pub xz_scale: f64,
    /// Y scale factor
    pub y_scale: f64,
    /// The sampled noise
    pub noise: NoiseHolder,
}

impl ShiftedNoise {
    pub(crate) fn sample<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f64 {
        let x = f64::from(ctx.block_x) * self.xz_scale + stack.sample_at(self.shift_x, ctx, options);
        let y = f64::from(ctx.block_y) * self.y_scale + stack.sample_at(self.shift_y, ctx, options);
        let z = f64::from(ctx.block_z) * self.xz_scale + stack.sample_at(self.shift_z, ctx, options);
        self.noise.get_value(x, y, z)
    }
}

#[inline]
fn shift_value(noise: &NoiseHolder, x: f64, y: f64, z: f64) -> f64 {
    noise.get_value(x * 0.25, y * 0.25, z * 0.25) * 4.0
}

/// Shift noise generator A for coordinate offsetting.
///
/// Matches vanilla's `DensityFunctions.ShiftA`.
#[derive(Debug, Clone)]
pub struct ShiftA {
    /// The offset noise
    pub noise: NoiseHolder,
}

impl ShiftA {
    #[inline]
    pub(crate) fn sample(&self, ctx: &FunctionContext) -> f64 {
        shift_value(&self.noise, f64::from(ctx.block_x), 0.0, f64::from(ctx.block_z))
    }
}

/// Shift noise generator B for coordinate offsetting.
///
/// Matches vanilla's `DensityFunctions.ShiftB`.
#[derive(Debug, Clone)]
pub struct ShiftB {
    /// The offset noise
    pub noise: NoiseHolder,
}

impl ShiftB {
    #[inline]
    pub(crate) fn sample(&self, ctx: &FunctionContext) -> f64 {
        shift_value(&self.noise, f64::from(ctx.block_z), f64::from(ctx.block_x), 0.0)
    }
}

/// Generic shift noise generator for coordinate offsetting.
///
/// Matches vanilla's `DensityFunctions.Shift`.
#[derive(Debug, Clone)]
pub struct Shift {
    /// The offset noise
    pub noise: NoiseHolder,
}

impl Shift {
    #[inline]
    pub(crate) fn sample(&self, ctx: &FunctionContext) -> f64 {
        shift_value(
            &self.noise,
            f64::from(ctx.block_x),
            f64::from(ctx.block_y),
            f64::from(ctx.block_z),
        )
    }
}

/// Base 3D terrain noise.
///
/// The template carries only the shape parameters; seed binding attaches the
/// seeded [`BlendedNoise`].
#[derive(Debug, Clone)]
pub struct BlendedNoiseFunction {
    /// Shape parameters
    pub parameters: BlendedNoiseParameters,
    /// Seeded noise, `None` before binding.
    pub noise: Option<Arc<BlendedNoise>>,
}

impl BlendedNoiseFunction {
    /// An unseeded template.
    #[must_use]
    pub const fn unseeded(parameters: BlendedNoiseParameters) -> Self {
        Self {
            parameters,
            noise: None,
        }
    }

    #[inline]
    pub(crate) fn sample(&self, ctx: &FunctionContext) -> f64 {
        self.noise
            .as_ref()
            .map_or(0.0, |noise| noise.sample(ctx.block_x, ctx.block_y, ctx.block_z))
    }

    pub(crate) fn max_value(&self) -> f64 {
        self.noise
            .as_ref()
            .map_or_else(|| self.parameters.max_value(), |noise| noise.max_value())
    }
}
