//! Arithmetic density functions: constants, linear transforms, two-argument
//! operations, pure mappers and clamps.

use super::chunk::SampleOptions;
use super::{ContextProvider, DagSampler, DensityStack, FunctionContext};

/// A constant density value.
///
/// Matches vanilla's `DensityFunctions.Constant`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant {
    /// The constant value.
    pub value: f64,
}

/// The operation of a [`Linear`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearType {
    /// `input * argument`
    Mul,
    /// `input + argument`
    Add,
}

/// A two-argument operation whose second argument is a constant.
///
/// Matches vanilla's `DensityFunctions.MulOrAdd`. Unlike [`TwoArgumentSimple`]
/// it never skips its input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    /// Input node.
    pub input: usize,
    /// The operation.
    pub op: LinearType,
    /// The constant operand.
    pub argument: f64,
    pub(crate) min_value: f64,
    pub(crate) max_value: f64,
}

impl Linear {
    pub(crate) const fn new(input: usize, op: LinearType, argument: f64) -> Self {
        Self {
            input,
            op,
            argument,
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
        }
    }

    /// Applies the transform to an input value.
    #[inline]
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        match self.op {
            LinearType::Mul => value * self.argument,
            LinearType::Add => value + self.argument,
        }
    }

    pub(crate) fn update_range(&mut self, ranges: &DagSampler<'_>) {
        let (min, max) = (ranges.min_at(self.input), ranges.max_at(self.input));
        (self.min_value, self.max_value) = match self.op {
            LinearType::Add => (min + self.argument, max + self.argument),
            // Blend nodes span all reals; 0 * inf must not become NaN.
            LinearType::Mul if self.argument == 0.0 => (0.0, 0.0),
            LinearType::Mul if self.argument > 0.0 =>(min * self.argument, max * self.argument),
            LinearType::Mul => (max * self.argument, min * self.argument),
        };
    }
}

/// The type of two-argument operation.
///
/// Matches vanilla's `DensityFunctions.TwoArgumentSimpleFunction.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoArgType {
    /// Add two density functions.
    Add,
    /// Multiply two density functions.
    Mul,
    /// Take the minimum of two density functions.
    Min,
    /// Take the maximum of two density functions.
    Max,
}

/// A two-argument density function (add, mul, min, max).
///
/// `argument1` is always evaluated. `argument2` is skipped when the result is
/// already decided: a zero product, or a first operand beyond the static
/// bound of the second for min and max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoArgumentSimple {
    /// The operation type
    pub op: TwoArgType,
    /// First argument
    pub argument1: usize,
    /// Second argument
    pub argument2: usize,
    pub(crate) min_value: f64,
    pub(crate) max_value: f64,
}

impl TwoArgumentSimple {
    pub(crate) const fn new(op: TwoArgType, argument1: usize, argument2: usize) -> Self {
        Self {
            op,
            argument1,
            argument2,
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
        }
    }

    #[inline]
    fn combine<S: DensityStack + ?Sized>(
        &self,
        first: f64,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f64 {
        match self.op {
            TwoArgType::Add => first + stack.sample_at(self.argument2, ctx, options),
            TwoArgType::Mul => {
                if first == 0.0 {
                    0.0
                } else {
                    first * stack.sample_at(self.argument2, ctx, options)
                }
            }
            TwoArgType::Min => {
                if first <= stack.min_at(self.argument2) {
                    first
                } else {
                    first.min(stack.sample_at(self.argument2, ctx, options))
                }
            }
            TwoArgType::Max => {
                if first >= stack.max_at(self.argument2) {
                    first
                } else {
                    first.max(stack.sample_at(self.argument2, ctx, options))
                }
            }
        }
    }

    pub(crate) fn sample<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f64 {
        let first = stack.sample_at(self.argument1, ctx, options);
        self.combine(first, stack, ctx, options)
    }

    pub(crate) fn fill<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        stack.fill_at(self.argument1, out, provider, options);
        if self.op == TwoArgType::Add {
            let mut second = vec![0.0; out.len()];
            stack.fill_at(self.argument2, &mut second, provider, options);
            for (value, other) in out.iter_mut().zip(second) {
                *value += other;
            }
            return;
        }
        for (index, value) in out.iter_mut().enumerate() {
            let ctx = provider.at(index, Some(options));
            *value = self.combine(*value, stack, &ctx, options);
        }
    }

    pub(crate) fn update_range(&mut self, ranges: &DagSampler<'_>) {
        let a = (ranges.min_at(self.argument1), ranges.max_at(self.argument1));
        let b = (ranges.min_at(self.argument2), ranges.max_at(self.argument2));
        (self.min_value, self.max_value) = match self.op {
            TwoArgType::Add => (a.0 + b.0, a.1 + b.1),
            TwoArgType::Mul => mul_range(a, b),
            TwoArgType::Min => (a.0.min(b.0), a.1.min(b.1)),
            TwoArgType::Max => (a.0.max(b.0), a.1.max(b.1)),
        };
        if self.min_value > self.max_value {
            tracing::warn!(op = ?self.op, "degenerate range {}..{}", self.min_value, self.max_value);
        }
    }
}

/// Bounds of a product, taken over the four corner products.
///
/// A zero times an infinite bound counts as zero.
pub(crate) fn mul_range(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let corner = |x: f64, y: f64| if x == 0.0 || y == 0.0 { 0.0 } else { x * y };
    let corners = [corner(a.0, b.0), corner(a.0, b.1), corner(a.1, b.0), corner(a.1, b.1)];
    corners
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| (lo.min(*c), hi.max(*c)))
}

/// The type of mapped (pure transformer) operation.
///
/// Matches vanilla's `DensityFunctions.Mapped.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedType {
    /// Absolute value.
    Abs,
    /// Square the value.
    Square,
    /// Cube the value.
    Cube,
    /// Half negative: if v > 0 then v else v * 0.5
    HalfNegative,
    /// Quarter negative: if v > 0 then v else v * 0.25
    QuarterNegative,
    /// Squeeze: clamp(-1, 1) then apply c/2 - c^3/24
    Squeeze,
}

impl MappedType {
    /// Applies the mapping to a value.
    #[inline]
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Abs => value.abs(),
            Self::Square => value * value,
            Self::Cube => value * value * value,
            Self::HalfNegative => {
                if value > 0.0 {
                    value
                } else {
                    value * 0.5
                }
            }
            Self::QuarterNegative => {
                if value > 0.0 {
                    value
                } else {
                    value * 0.25
                }
            }
            Self::Squeeze => {
                let c = value.clamp(-1.0, 1.0);
                c / 2.0 - c * c * c / 24.0
            }
        }
    }

    /// Output bounds for an input in `[min, max]`.
    ///
    /// Every mapping except abs and square is monotonic. Those two reach
    /// zero whenever the input range straddles it.
    #[must_use]
    pub fn range(self, min: f64, max: f64) -> (f64, f64) {
        let (lo, hi) = (self.apply(min), self.apply(max));
        match self {
            Self::Abs | Self::Square => {
                let lower = if min > 0.0 {
                    lo
                } else if max < 0.0 {
                    hi
                } else {
                    0.0
                };
                (lower, lo.max(hi))
            }
            _ => (lo, hi),
        }
    }
}

/// A mapped (pure transformer) density function.
///
/// Matches vanilla's `DensityFunctions.Mapped`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapped {
    /// The mapping type
    pub op: MappedType,
    /// Input node
    pub input: usize,
    pub(crate) min_value: f64,
    pub(crate) max_value: f64,
}

impl Mapped {
    pub(crate) const fn new(op: MappedType, input: usize) -> Self {
        Self {
            op,
            input,
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
        }
    }

    pub(crate) fn update_range(&mut self, ranges: &DagSampler<'_>) {
        (self.min_value, self.max_value) = self
            .op
            .range(ranges.min_at(self.input), ranges.max_at(self.input));
    }
}

/// Clamp a density function value to a range.
///
/// Matches vanilla's `DensityFunctions.Clamp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamp {
    /// Input node
    pub input: usize,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_values() {
        assert!((MappedType::HalfNegative.apply(-2.0) + 1.0).abs() < 1e-12);
        assert!((MappedType::QuarterNegative.apply(-2.0) + 0.5).abs() < 1e-12);
        assert!((MappedType::HalfNegative.apply(3.0) - 3.0).abs() < 1e-12);
        assert!((MappedType::Squeeze.apply(5.0) - (0.5 - 1.0 / 24.0)).abs() < 1e-12);
        assert!((MappedType::Cube.apply(-2.0) + 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_abs_and_square_ranges() {
        assert_eq!(MappedType::Abs.range(-3.0, 1.0), (0.0, 3.0));
        assert_eq!(MappedType::Abs.range(-3.0, -1.0), (1.0, 3.0));
        assert_eq!(MappedType::Square.range(0.5, 2.0), (0.25, 4.0));
        assert_eq!(MappedType::Square.range(-2.0, 0.5), (0.0, 4.0));
    }

    #[test]
    fn test_monotonic_ranges() {
        assert_eq!(MappedType::Cube.range(-2.0, 1.0), (-8.0, 1.0));
        assert_eq!(MappedType::QuarterNegative.range(-4.0, 2.0), (-1.0, 2.0));
        let (lo, hi) = MappedType::Squeeze.range(-10.0, 10.0);
        assert!((lo + (0.5 - 1.0 / 24.0)).abs() < 1e-12);
        assert!((hi - (0.5 - 1.0 / 24.0)).abs() < 1e-12);
    }

    #[test]
    fn test_mul_range_mixed_signs() {
        assert_eq!(mul_range((-2.0, 3.0), (-1.0, 4.0)), (-8.0, 12.0));
        assert_eq!(mul_range((-2.0, -1.0), (-3.0, -2.0)), (2.0, 6.0));
        assert_eq!(mul_range((0.0, 1.0), (f64::NEG_INFINITY, f64::INFINITY)), (f64::NEG_INFINITY, f64::INFINITY));
    }
}
