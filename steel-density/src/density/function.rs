//! The [`DensityFunction`] node enum and its per-variant dispatch.
//!
//! Each density function type is its own struct, mirroring vanilla's separate
//! record/class pattern. The enum wraps them for dispatch.

use smallvec::SmallVec;

use super::chunk::SampleOptions;
use super::math::{Clamp, Constant, Linear, Mapped, TwoArgumentSimple};
use super::misc::{
    BlendAlpha, BlendDensity, BlendOffset, EndIslandsFunction, Marker, RangeChoice, Reference,
    WeirdScaledSampler, YClampedGradient,
};
use super::noise::{BlendedNoiseFunction, Noise, Shift, ShiftA, ShiftB, ShiftedNoise};
use super::spline::SplineFunction;
use super::{ContextProvider, DagSampler, DensityStack, FunctionContext, fill_each};
use crate::error::DensityError;

/// Input indices of a node. Most nodes have at most three.
pub type NodeInputs = SmallVec<[usize; 4]>;

/// A node of the density DAG.
#[derive(Debug, Clone)]
pub enum DensityFunction {
    /// A constant value.
    Constant(Constant),

    /// An indirection to a shared node.
    Reference(Reference),

    /// A Y-axis clamped gradient.
    YClampedGradient(YClampedGradient),

    /// Sample from a noise generator.
    Noise(Noise),

    /// Sample from a noise generator at child-shifted coordinates.
    ShiftedNoise(ShiftedNoise),

    /// Shift noise A, sampled at `(x, 0, z)`.
    ShiftA(ShiftA),

    /// Shift noise B, sampled at `(z, x, 0)`.
    ShiftB(ShiftB),

    /// Shift noise sampled at `(x, y, z)`.
    Shift(Shift),

    /// Base 3D terrain noise.
    BlendedNoise(BlendedNoiseFunction),

    /// Rarity-scaled noise for cave generation.
    WeirdScaledSampler(WeirdScaledSampler),

    /// End island height field.
    EndIslands(EndIslandsFunction),

    /// `input * k` or `input + k`.
    Linear(Linear),

    /// Two-argument operation (add, mul, min, max).
    TwoArgumentSimple(TwoArgumentSimple),

    /// Mapped (pure transformer) operation (abs, square, cube, etc.).
    Mapped(Mapped),

    /// Clamp the value to a range.
    Clamp(Clamp),

    /// Choose between two functions based on input range.
    RangeChoice(RangeChoice),

    /// Cubic spline evaluation.
    Spline(SplineFunction),

    /// Blend alpha, 1 without a blending context.
    BlendAlpha(BlendAlpha),

    /// Blend offset, 0 without a blending context.
    BlendOffset(BlendOffset),

    /// Blend density, the input without a blending context.
    BlendDensity(BlendDensity),

    /// Cache/marker wrapper.
    Marker(Marker),
}

impl DensityFunction {
    /// Samples this node, reading inputs from `stack`.
    pub fn sample<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f64 {
        match self {
            Self::Constant(f) => f.value,
            Self::Reference(f) => stack.sample_at(f.target, ctx, options),
            Self::YClampedGradient(f) => f.sample(ctx),
            Self::Noise(f) => f.sample(ctx),
            Self::ShiftedNoise(f) => f.sample(stack, ctx, options),
            Self::ShiftA(f) => f.sample(ctx),
            Self::ShiftB(f) => f.sample(ctx),
            Self::Shift(f) => f.sample(ctx),
            Self::BlendedNoise(f) => f.sample(ctx),
            Self::WeirdScaledSampler(f) => f.sample(stack, ctx, options),
            Self::EndIslands(f) => f.sample(ctx),
            Self::Linear(f) => f.apply(stack.sample_at(f.input, ctx, options)),
            Self::TwoArgumentSimple(f) => f.sample(stack, ctx, options),
            Self::Mapped(f) => f.op.apply(stack.sample_at(f.input, ctx, options)),
            Self::Clamp(f) => stack.sample_at(f.input, ctx, options).clamp(f.min, f.max),
            Self::RangeChoice(f) => f.sample(stack, ctx, options),
            Self::Spline(f) => f.sample(stack, ctx, options),
            Self::BlendAlpha(_) => 1.0,
            Self::BlendOffset(_) => 0.0,
            Self::BlendDensity(f) => stack.sample_at(f.input, ctx, options),
            Self::Marker(f) => stack.sample_at(f.wrapped, ctx, options),
        }
    }

    /// Fills `out` with this node sampled at every context of `provider`.
    pub fn fill<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        match self {
            Self::Constant(f) => out.fill(f.value),
            Self::Reference(f) => stack.fill_at(f.target, out, provider, options),
            Self::Linear(f) => {
                stack.fill_at(f.input, out, provider, options);
                out.iter_mut().for_each(|v| *v = f.apply(*v));
            }
            Self::Mapped(f) => {
                stack.fill_at(f.input, out, provider, options);
                out.iter_mut().for_each(|v| *v = f.op.apply(*v));
            }
            Self::Clamp(f) => {
                stack.fill_at(f.input, out, provider, options);
                out.iter_mut().for_each(|v| *v = v.clamp(f.min, f.max));
            }
            Self::TwoArgumentSimple(f) => f.fill(stack, out, provider, options),
            Self::RangeChoice(f) => f.fill(stack, out, provider, options),
            Self::BlendAlpha(_) => out.fill(1.0),
            Self::BlendOffset(_) => out.fill(0.0),
            Self::BlendDensity(f) => stack.fill_at(f.input, out, provider, options),
            Self::Marker(f) => stack.fill_at(f.wrapped, out, provider, options),
            _ => fill_each(out, provider, options, |ctx, options| {
                self.sample(stack, ctx, options)
            }),
        }
    }

    /// Lower bound over every context.
    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.range().0
    }

    /// Upper bound over every context.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.range().1
    }

    fn range(&self) -> (f64, f64) {
        match self {
            Self::Constant(f) => (f.value, f.value),
            Self::Reference(f) => (f.min_value, f.max_value),
            Self::YClampedGradient(f) => f.range(),
            Self::Noise(f) => {
                let max = f.noise.max_value();
                (-max, max)
            }
            Self::ShiftedNoise(f) => {
                let max = f.noise.max_value();
                (-max, max)
            }
            Self::ShiftA(ShiftA { noise }) | Self::ShiftB(ShiftB { noise }) | Self::Shift(Shift { noise }) => {
                let max = noise.max_value() * 4.0;
                (-max, max)
            }
            Self::BlendedNoise(f) => {
                let max = f.max_value();
                (-max, max)
            }
            Self::WeirdScaledSampler(f) => (0.0, f.max_value()),
            Self::EndIslands(_) => EndIslandsFunction::range(),
            Self::Linear(f) => (f.min_value, f.max_value),
            Self::TwoArgumentSimple(f) => (f.min_value, f.max_value),
            Self::Mapped(f) => (f.min_value, f.max_value),
            Self::Clamp(f) => (f.min, f.max),
            Self::RangeChoice(f) => (f.min_value, f.max_value),
            Self::Spline(f) => (f.min_value, f.max_value),
            Self::BlendAlpha(_) => (0.0, 1.0),
            Self::BlendOffset(_) | Self::BlendDensity(_) => (f64::NEG_INFINITY, f64::INFINITY),
            Self::Marker(f) => (f.min_value, f.max_value),
        }
    }

    /// Indices this node reads, in no particular order.
    #[must_use]
    pub fn inputs(&self) -> NodeInputs {
        let mut inputs = NodeInputs::new();
        match self {
            Self::Constant(_)
            | Self::YClampedGradient(_)
            | Self::Noise(_)
            | Self::ShiftA(_)
            | Self::ShiftB(_)
            | Self::Shift(_)
            | Self::BlendedNoise(_)
            | Self::EndIslands(_)
            | Self::BlendAlpha(_)
            | Self::BlendOffset(_) => {}
            Self::Reference(f) => inputs.push(f.target),
            Self::ShiftedNoise(f) => inputs.extend([f.shift_x, f.shift_y, f.shift_z]),
            Self::WeirdScaledSampler(f) => inputs.push(f.input),
            Self::Linear(f) => inputs.push(f.input),
            Self::TwoArgumentSimple(f) => inputs.extend([f.argument1, f.argument2]),
            Self::Mapped(f) => inputs.push(f.input),
            Self::Clamp(f) => inputs.push(f.input),
            Self::RangeChoice(f) => {
                inputs.extend([f.input, f.when_in_range, f.when_out_of_range]);
            }
            Self::Spline(f) => f.spline.collect_coordinates(&mut inputs),
            Self::BlendDensity(f) => inputs.push(f.input),
            Self::Marker(f) => inputs.push(f.wrapped),
        }
        inputs
    }

    /// Replaces every input index through `remap`.
    pub fn try_map_inputs(
        &mut self,
        remap: &mut impl FnMut(usize) -> Result<usize, DensityError>,
    ) -> Result<(), DensityError> {
        match self {
            Self::Constant(_)
            | Self::YClampedGradient(_)
            | Self::Noise(_)
            | Self::ShiftA(_)
            | Self::ShiftB(_)
            | Self::Shift(_)
            | Self::BlendedNoise(_)
            | Self::EndIslands(_)
            | Self::BlendAlpha(_)
            | Self::BlendOffset(_) => {}
            Self::Reference(f) => f.target = remap(f.target)?,
            Self::ShiftedNoise(f) => {
                f.shift_x = remap(f.shift_x)?;
                f.shift_y = remap(f.shift_y)?;
                f.shift_z = remap(f.shift_z)?;
            }
            Self::WeirdScaledSampler(f) => f.input = remap(f.input)?,
            Self::Linear(f) => f.input = remap(f.input)?,
            Self::TwoArgumentSimple(f) => {
                f.argument1 = remap(f.argument1)?;
                f.argument2 = remap(f.argument2)?;
            }
            Self::Mapped(f) => f.input = remap(f.input)?,
            Self::Clamp(f) => f.input = remap(f.input)?,
            Self::RangeChoice(f) => {
                f.input = remap(f.input)?;
                f.when_in_range = remap(f.when_in_range)?;
                f.when_out_of_range = remap(f.when_out_of_range)?;
            }
            Self::Spline(f) => f.map_coordinates(remap)?,
            Self::BlendDensity(f) => f.input = remap(f.input)?,
            Self::Marker(f) => f.wrapped = remap(f.wrapped)?,
        }
        Ok(())
    }

    /// Recomputes the cached bounds from the current bounds of the inputs.
    pub(crate) fn update_range(&mut self, ranges: &DagSampler<'_>) {
        match self {
            Self::Reference(f) => {
                f.min_value = ranges.min_at(f.target);
                f.max_value = ranges.max_at(f.target);
            }
            Self::Linear(f) => f.update_range(ranges),
            Self::TwoArgumentSimple(f) => f.update_range(ranges),
            Self::Mapped(f) => f.update_range(ranges),
            Self::RangeChoice(f) => f.update_range(ranges),
            Self::Spline(f) => f.update_range(ranges),
            Self::Marker(f) => {
                f.min_value = ranges.min_at(f.wrapped);
                f.max_value = ranges.max_at(f.wrapped);
            }
            _ => {}
        }
    }

    /// The value of a constant node.
    #[must_use]
    pub const fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Constant(f) => Some(f.value),
            _ => None,
        }
    }
}
