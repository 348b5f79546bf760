//! Cubic spline density functions.
//!
//! A spline maps the value of a coordinate node through hermite segments
//! between sorted control points. Point values may themselves be splines over
//! other coordinates, which is how terrain offset and factor depend on several
//! climate parameters at once. Evaluation is done in `f32` like vanilla.

use std::sync::Arc;

use super::chunk::SampleOptions;
use super::function::NodeInputs;
use super::{DagSampler, DensityStack, FunctionContext};
use crate::error::DensityError;

/// A spline point value can be either a constant or a nested spline.
#[derive(Debug, Clone)]
pub enum SplineValue {
    /// A constant value.
    Constant(f32),
    /// A nested spline.
    Spline(Box<CubicSpline>),
}

impl SplineValue {
    fn apply<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f32 {
        match self {
            Self::Constant(value) => *value,
            Self::Spline(spline) => spline.apply(stack, ctx, options),
        }
    }

    fn bounds(&self, ranges: &DagSampler<'_>) -> (f32, f32) {
        match self {
            Self::Constant(value) => (*value, *value),
            Self::Spline(spline) => spline.bounds(ranges),
        }
    }
}

/// A point in a cubic spline.
#[derive(Debug, Clone)]
pub struct SplinePoint {
    /// The location (input value) of this point.
    pub location: f32,
    /// The value or nested spline at this point.
    pub value: SplineValue,
    /// The derivative at this point.
    pub derivative: f32,
}

impl SplinePoint {
    /// A point with a constant value.
    #[must_use]
    pub const fn constant(location: f32, value: f32, derivative: f32) -> Self {
        Self {
            location,
            value: SplineValue::Constant(value),
            derivative,
        }
    }

    /// A point whose value is a nested spline.
    #[must_use]
    pub fn nested(location: f32, spline: CubicSpline, derivative: f32) -> Self {
        Self {
            location,
            value: SplineValue::Spline(Box::new(spline)),
            derivative,
        }
    }

    /// Continues `value` along the derivative past the end of the spline.
    fn extend(&self, location: f32, value: f32) -> f32 {
        if self.derivative == 0.0 {
            value
        } else {
            value + self.derivative * (location - self.location)
        }
    }

    /// Hermite segment from this point to `next` with endpoint values `y1` and `y2`.
    fn hermite(&self, next: &Self, (y1, y2): (f32, f32), location: f32) -> f32 {
        let span = next.location - self.location;
        let t = (location - self.location) / span;
        let rise = y2 - y1;
        let a = self.derivative * span - rise;
        let b = -next.derivative * span + rise;
        (y1 + t * rise) + t * (1.0 - t) * (a + t * (b - a))
    }
}

/// A cubic spline over a coordinate node.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// Node whose value selects the position along the spline.
    pub coordinate: usize,
    /// The control points, sorted by location.
    pub points: Vec<SplinePoint>,
}

impl CubicSpline {
    /// Creates a spline from points sorted by location.
    #[must_use]
    pub const fn new(coordinate: usize, points: Vec<SplinePoint>) -> Self {
        Self { coordinate, points }
    }

    /// Index of the last point at or below `location`, `None` before the first.
    fn segment(&self, location: f32) -> Option<usize> {
        self.points
            .partition_point(|point| point.location <= location)
            .checked_sub(1)
    }

    /// Evaluates the spline.
    ///
    /// Only the one or two points around the coordinate value are sampled.
    pub fn apply<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f32 {
        let location = stack.sample_at(self.coordinate, ctx, options) as f32;
        let Some(first) = self.points.first() else {
            return 0.0;
        };
        let Some(start) = self.segment(location) else {
            return first.extend(location, first.value.apply(stack, ctx, options));
        };
        match &self.points[start..] {
            [p1, p2, ..] => {
                let y1 = p1.value.apply(stack, ctx, options);
                let y2 = p2.value.apply(stack, ctx, options);
                p1.hermite(p2, (y1, y2), location)
            }
            [last] => last.extend(location, last.value.apply(stack, ctx, options)),
            [] => 0.0,
        }
    }

    /// Output bounds given the current bounds of every coordinate node.
    fn bounds(&self, ranges: &DagSampler<'_>) -> (f32, f32) {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return (0.0, 0.0);
        };
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        let input_min = ranges.min_at(self.coordinate) as f32;
        let input_max = ranges.max_at(self.coordinate) as f32;

        if input_min < first.location {
            let (lo, hi) = first.value.bounds(ranges);
            let (a, b) = (first.extend(input_min, lo), first.extend(input_min, hi));
            min = min.min(a.min(b));
            max = max.max(a.max(b));
        }

        if input_max > last.location {
            let (lo, hi) = last.value.bounds(ranges);
            let (a, b) = (last.extend(input_max, lo), last.extend(input_max, hi));
            min = min.min(a.min(b));
            max = max.max(a.max(b));
        }

        for point in &self.points {
            let (lo, hi) = point.value.bounds(ranges);
            min = min.min(lo);
            max = max.max(hi);
        }

        for pair in self.points.windows(2) {
            let (p1, p2) = (&pair[0], &pair[1]);
            if p1.derivative == 0.0 && p2.derivative == 0.0 {
                continue;
            }
            let span = p2.location - p1.location;
            let (min1, max1) = p1.value.bounds(ranges);
            let (min2, max2) = p2.value.bounds(ranges);
            let partial1 = p1.derivative * span;
            let partial2 = p2.derivative * span;

            let low = (partial1 - max2 + min1).min(-partial2 + min2 - max1);
            let high = (partial1 - min2 + max1).max(-partial2 + max2 - min1);

            min = min.min(min1.min(min2) + 0.25 * low);
            max = max.max(max1.max(max2) + 0.25 * high);
        }

        (min, max)
    }

    pub(crate) fn collect_coordinates(&self, out: &mut NodeInputs) {
        out.push(self.coordinate);
        for point in &self.points {
            if let SplineValue::Spline(nested) = &point.value {
                nested.collect_coordinates(out);
            }
        }
    }

    fn map_coordinates(
        &mut self,
        remap: &mut impl FnMut(usize) -> Result<usize, DensityError>,
    ) -> Result<(), DensityError> {
        self.coordinate = remap(self.coordinate)?;
        for point in &mut self.points {
            if let SplineValue::Spline(nested) = &mut point.value {
                nested.map_coordinates(remap)?;
            }
        }
        Ok(())
    }
}

/// Cubic spline density function.
///
/// Matches vanilla's `DensityFunctions.Spline`.
#[derive(Debug, Clone)]
pub struct SplineFunction {
    /// The cubic spline.
    pub spline: Arc<CubicSpline>,
    pub(crate) min_value: f64,
    pub(crate) max_value: f64,
}

impl SplineFunction {
    pub(crate) fn new(spline: CubicSpline) -> Self {
        Self {
            spline: Arc::new(spline),
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
        }
    }

    pub(crate) fn sample<S: DensityStack + ?Sized>(
        &self,
        stack: &mut S,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> f64 {
        f64::from(self.spline.apply(stack, ctx, options))
    }

    pub(crate) fn update_range(&mut self, ranges: &DagSampler<'_>) {
        let (min, max) = self.spline.bounds(ranges);
        self.min_value = f64::from(min);
        self.max_value = f64::from(max);
    }

    pub(crate) fn map_coordinates(
        &mut self,
        remap: &mut impl FnMut(usize) -> Result<usize, DensityError>,
    ) -> Result<(), DensityError> {
        Arc::make_mut(&mut self.spline).map_coordinates(remap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::ContextProvider;

    /// Coordinate nodes with fixed values that remember what was sampled.
    struct Coordinates {
        values: Vec<f64>,
        sampled: Vec<usize>,
    }

    impl Coordinates {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                sampled: Vec::new(),
            }
        }
    }

    impl DensityStack for Coordinates {
        fn sample_at(&mut self, index: usize, _: &FunctionContext, _: &SampleOptions) -> f64 {
            self.sampled.push(index);
            self.values[index]
        }

        fn fill_at(&mut self, _: usize, _: &mut [f64], _: &dyn ContextProvider, _: &mut SampleOptions) {
            unreachable!("splines sample single contexts");
        }

        fn min_at(&self, index: usize) -> f64 {
            self.values[index]
        }

        fn max_at(&self, index: usize) -> f64 {
            self.values[index]
        }
    }

    fn at(spline: &CubicSpline, values: &[f64]) -> f32 {
        let mut stack = Coordinates::new(values);
        spline.apply(&mut stack, &FunctionContext::new(0, 0, 0), &SampleOptions::skip_cell_caches())
    }

    fn three_points() -> CubicSpline {
        CubicSpline::new(
            0,
            vec![
                SplinePoint::constant(0.0, 5.0, 0.0),
                SplinePoint::constant(1.0, 7.0, 0.0),
                SplinePoint::constant(2.0, -3.0, 0.0),
            ],
        )
    }

    #[test]
    fn test_segment_selection() {
        let spline = three_points();
        assert_eq!(spline.segment(-1.0), None);
        assert_eq!(spline.segment(0.5), Some(0));
        assert_eq!(spline.segment(1.0), Some(1));
        assert_eq!(spline.segment(3.0), Some(2));
    }

    #[test]
    fn test_points_are_hit_exactly() {
        let spline = three_points();
        assert_eq!(at(&spline, &[0.0]), 5.0);
        assert_eq!(at(&spline, &[1.0]), 7.0);
        assert_eq!(at(&spline, &[2.0]), -3.0);
    }

    #[test]
    fn test_matching_slopes_interpolate_linearly() {
        let spline = CubicSpline::new(
            0,
            vec![SplinePoint::constant(0.0, 0.0, 1.0), SplinePoint::constant(1.0, 1.0, 1.0)],
        );
        assert!((at(&spline, &[0.5]) - 0.5).abs() < 1e-6);
        assert!((at(&spline, &[0.25]) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_extends_along_end_derivatives() {
        let spline = CubicSpline::new(
            0,
            vec![SplinePoint::constant(0.0, 0.0, 2.0), SplinePoint::constant(1.0, 1.0, 3.0)],
        );
        assert!((at(&spline, &[-1.0]) + 2.0).abs() < 1e-6);
        assert!((at(&spline, &[2.0]) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_samples_only_neighbouring_points() {
        let nested = |coordinate| CubicSpline::new(coordinate, vec![SplinePoint::constant(0.0, 1.0, 0.0)]);
        let spline = CubicSpline::new(
            0,
            vec![
                SplinePoint::nested(-1.0, nested(1), 0.0),
                SplinePoint::nested(0.0, nested(2), 0.0),
                SplinePoint::nested(1.0, nested(3), 0.0),
                SplinePoint::nested(2.0, nested(4), 0.0),
            ],
        );
        let mut stack = Coordinates::new(&[0.5, 0.0, 0.0, 0.0, 0.0]);
        let value = spline.apply(&mut stack, &FunctionContext::new(0, 0, 0), &SampleOptions::skip_cell_caches());
        assert!((value - 1.0).abs() < 1e-6);
        assert_eq!(stack.sampled, vec![0, 2, 3]);
    }

    #[test]
    fn test_empty_spline_is_zero() {
        assert_eq!(at(&CubicSpline::new(0, Vec::new()), &[4.0]), 0.0);
    }
}
