//! The append-only density arena, its builders and the memoized rewrite.

use rustc_hash::FxHashMap;

use super::chunk::SampleOptions;
use super::function::DensityFunction;
use super::math::{Clamp, Constant, Linear, LinearType, Mapped, MappedType, TwoArgType, TwoArgumentSimple};
use super::misc::{
    BlendAlpha, BlendDensity, BlendOffset, EndIslandsFunction, Marker, MarkerType, RangeChoice,
    RarityValueMapper, Reference, WeirdScaledSampler, YClampedGradient,
};
use super::noise::{BlendedNoiseFunction, Noise, NoiseHolder, Shift, ShiftA, ShiftB, ShiftedNoise};
use super::spline::{CubicSpline, SplineFunction};
use super::{ContextProvider, DagSampler, DensityStack, FunctionContext};
use crate::error::DensityError;
use crate::noise::BlendedNoiseParameters;

/// Rewrites one node during a DAG rewrite.
///
/// The node handed to the visitor already has its inputs remapped into the
/// target arena; the visitor returns the node to store in its place.
pub trait DensityVisitor {
    /// Transforms a node.
    ///
    /// # Errors
    /// Whatever the visitor fails with aborts the rewrite.
    fn visit(&mut self, node: DensityFunction) -> Result<DensityFunction, DensityError>;
}

impl<F> DensityVisitor for F
where
    F: FnMut(DensityFunction) -> Result<DensityFunction, DensityError>,
{
    fn visit(&mut self, node: DensityFunction) -> Result<DensityFunction, DensityError> {
        self(node)
    }
}

/// An arena of density nodes in topological order.
///
/// A node can only be pushed once all of its inputs are in the arena, so
/// every input index is lower than the index of its reader and the arena is
/// acyclic by construction.
///
/// The builders never panic. A builder handed an index that is not in the
/// arena stores a zero constant in its slot and remembers the error, which
/// [`DensityDag::validate`] reports.
#[derive(Debug, Clone, Default)]
pub struct DensityDag {
    nodes: Vec<DensityFunction>,
    invalid: Option<DensityError>,
}

impl DensityDag {
    /// An empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            invalid: None,
        }
    }

    /// Checks that every builder call so far referenced existing nodes.
    ///
    /// # Errors
    /// Returns the first [`DensityError::DanglingReference`] a builder hit.
    pub fn validate(&self) -> Result<(), DensityError> {
        self.invalid.clone().map_or(Ok(()), Err)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in index order.
    #[must_use]
    pub fn nodes(&self) -> &[DensityFunction] {
        &self.nodes
    }

    /// The node at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DensityFunction> {
        self.nodes.get(index)
    }

    /// Appends a node after checking its inputs and computing its bounds.
    ///
    /// # Errors
    /// Returns [`DensityError::DanglingReference`] if an input is not below
    /// the new node's index.
    pub fn try_push(&mut self, mut node: DensityFunction) -> Result<usize, DensityError> {
        let len = self.nodes.len();
        if let Some(&index) = node.inputs().iter().find(|&&index| index >= len) {
            return Err(DensityError::DanglingReference { index, len });
        }
        node.update_range(&DagSampler::new(&self.nodes));
        self.nodes.push(node);
        Ok(len)
    }

    /// Appends a node for the builders, recording a bad input instead of failing.
    pub(crate) fn push(&mut self, node: DensityFunction) -> usize {
        self.try_push(node).unwrap_or_else(|err| {
            tracing::warn!(%err, "density builder referenced a missing node");
            if self.invalid.is_none() {
                self.invalid = Some(err);
            }
            self.nodes.push(DensityFunction::Constant(Constant { value: 0.0 }));
            self.nodes.len() - 1
        })
    }

    /// A constant.
    pub fn constant(&mut self, value: f64) -> usize {
        self.push(DensityFunction::Constant(Constant { value }))
    }

    /// An indirection to `target`.
    pub fn reference(&mut self, target: usize) -> usize {
        self.push(DensityFunction::Reference(Reference::new(target)))
    }

    /// A gradient from `from_value` at `from_y` to `to_value` at `to_y`.
    pub fn y_clamped_gradient(&mut self, from_y: i32, to_y: i32, from_value: f64, to_value: f64) -> usize {
        self.push(DensityFunction::YClampedGradient(YClampedGradient {
            from_y,
            to_y,
            from_value,
            to_value,
        }))
    }

    /// Unbound noise `key` at scaled block coordinates.
    pub fn noise(&mut self, key: &str, xz_scale: f64, y_scale: f64) -> usize {
        self.push(DensityFunction::Noise(Noise {
            noise: NoiseHolder::unbound(key),
            xz_scale,
            y_scale,
        }))
    }

    /// Unbound noise `key` at coordinates shifted by three nodes.
    pub fn shifted_noise(
        &mut self,
        key: &str,
        [shift_x, shift_y, shift_z]: [usize; 3],
        xz_scale: f64,
        y_scale: f64,
    ) -> usize {
        self.push(DensityFunction::ShiftedNoise(ShiftedNoise {
            shift_x,
            shift_y,
            shift_z,
            xz_scale,
            y_scale,
            noise: NoiseHolder::unbound(key),
        }))
    }

    /// Shift noise A.
    pub fn shift_a(&mut self, key: &str) -> usize {
        self.push(DensityFunction::ShiftA(ShiftA {
            noise: NoiseHolder::unbound(key),
        }))
    }

    /// Shift noise B.
    pub fn shift_b(&mut self, key: &str) -> usize {
        self.push(DensityFunction::ShiftB(ShiftB {
            noise: NoiseHolder::unbound(key),
        }))
    }

    /// Shift noise sampled in 3D.
    pub fn shift(&mut self, key: &str) -> usize {
        self.push(DensityFunction::Shift(Shift {
            noise: NoiseHolder::unbound(key),
        }))
    }

    /// Unseeded base terrain noise.
    pub fn blended_noise(&mut self, parameters: BlendedNoiseParameters) -> usize {
        self.push(DensityFunction::BlendedNoise(BlendedNoiseFunction::unseeded(parameters)))
    }

    /// Rarity-scaled noise `key` driven by `input`.
    pub fn weird_scaled(&mut self, input: usize, key: &str, rarity_value_mapper: RarityValueMapper) -> usize {
        self.push(DensityFunction::WeirdScaledSampler(WeirdScaledSampler {
            input,
            noise: NoiseHolder::unbound(key),
            rarity_value_mapper,
        }))
    }

    /// End island field, seeded with 0 until bound.
    pub fn end_islands(&mut self) -> usize {
        self.push(DensityFunction::EndIslands(EndIslandsFunction::new(0)))
    }

    fn two_argument(&mut self, op: TwoArgType, argument1: usize, argument2: usize) -> usize {
        let constants = (
            self.nodes.get(argument1).and_then(DensityFunction::as_constant),
            self.nodes.get(argument2).and_then(DensityFunction::as_constant),
        );
        let linear = match op {
            TwoArgType::Add => Some(LinearType::Add),
            TwoArgType::Mul => Some(LinearType::Mul),
            TwoArgType::Min | TwoArgType::Max => None,
        };
        match (linear, constants) {
            (Some(linear), (Some(a), Some(b))) => self.constant(match linear {
                LinearType::Add => a + b,
                LinearType::Mul => a * b,
            }),
            (Some(linear), (Some(k), None)) => self.push(DensityFunction::Linear(Linear::new(argument2, linear, k))),
            (Some(linear), (None, Some(k))) => self.push(DensityFunction::Linear(Linear::new(argument1, linear, k))),
            _ => self.push(DensityFunction::TwoArgumentSimple(TwoArgumentSimple::new(
                op, argument1, argument2,
            ))),
        }
    }

    /// `a + b`. A constant operand becomes a linear node.
    pub fn add(&mut self, a: usize, b: usize) -> usize {
        self.two_argument(TwoArgType::Add, a, b)
    }

    /// `a * b`. A constant operand becomes a linear node.
    pub fn mul(&mut self, a: usize, b: usize) -> usize {
        self.two_argument(TwoArgType::Mul, a, b)
    }

    /// `min(a, b)`, skipping `b` when `a` is below its lower bound.
    pub fn min(&mut self, a: usize, b: usize) -> usize {
        self.two_argument(TwoArgType::Min, a, b)
    }

    /// `max(a, b)`, skipping `b` when `a` is above its upper bound.
    pub fn max(&mut self, a: usize, b: usize) -> usize {
        self.two_argument(TwoArgType::Max, a, b)
    }

    fn mapped(&mut self, op: MappedType, input: usize) -> usize {
        self.push(DensityFunction::Mapped(Mapped::new(op, input)))
    }

    /// `|input|`
    pub fn abs(&mut self, input: usize) -> usize {
        self.mapped(MappedType::Abs, input)
    }

    /// `input²`
    pub fn square(&mut self, input: usize) -> usize {
        self.mapped(MappedType::Square, input)
    }

    /// `input³`
    pub fn cube(&mut self, input: usize) -> usize {
        self.mapped(MappedType::Cube, input)
    }

    /// Halves negative values.
    pub fn half_negative(&mut self, input: usize) -> usize {
        self.mapped(MappedType::HalfNegative, input)
    }

    /// Quarters negative values.
    pub fn quarter_negative(&mut self, input: usize) -> usize {
        self.mapped(MappedType::QuarterNegative, input)
    }

    /// Clamps to `[-1, 1]`, then `c/2 - c³/24`.
    pub fn squeeze(&mut self, input: usize) -> usize {
        self.mapped(MappedType::Squeeze, input)
    }

    /// Clamps `input` to `[min, max]`.
    pub fn clamp(&mut self, input: usize, min: f64, max: f64) -> usize {
        self.push(DensityFunction::Clamp(Clamp { input, min, max }))
    }

    /// Evaluates exactly one branch depending on `input`.
    pub fn range_choice(
        &mut self,
        input: usize,
        min_inclusive: f64,
        max_exclusive: f64,
        when_in_range: usize,
        when_out_of_range: usize,
    ) -> usize {
        self.push(DensityFunction::RangeChoice(RangeChoice::new(
            input,
            min_inclusive,
            max_exclusive,
            when_in_range,
            when_out_of_range,
        )))
    }

    /// A cubic spline.
    pub fn spline(&mut self, spline: CubicSpline) -> usize {
        self.push(DensityFunction::Spline(SplineFunction::new(spline)))
    }

    /// Blend alpha.
    pub fn blend_alpha(&mut self) -> usize {
        self.push(DensityFunction::BlendAlpha(BlendAlpha))
    }

    /// Blend offset.
    pub fn blend_offset(&mut self) -> usize {
        self.push(DensityFunction::BlendOffset(BlendOffset))
    }

    /// Blend density of `input`.
    pub fn blend_density(&mut self, input: usize) -> usize {
        self.push(DensityFunction::BlendDensity(BlendDensity { input }))
    }

    fn marker(&mut self, kind: MarkerType, wrapped: usize) -> usize {
        self.push(DensityFunction::Marker(Marker::new(kind, wrapped)))
    }

    /// Interpolation marker.
    pub fn interpolated(&mut self, wrapped: usize) -> usize {
        self.marker(MarkerType::Interpolated, wrapped)
    }

    /// Flat cache marker.
    pub fn flat_cache(&mut self, wrapped: usize) -> usize {
        self.marker(MarkerType::FlatCache, wrapped)
    }

    /// Column cache marker.
    pub fn cache_2d(&mut self, wrapped: usize) -> usize {
        self.marker(MarkerType::Cache2D, wrapped)
    }

    /// Single-value cache marker.
    pub fn cache_once(&mut self, wrapped: usize) -> usize {
        self.marker(MarkerType::CacheOnce, wrapped)
    }

    /// Whole-cell cache marker.
    pub fn cache_all_in_cell(&mut self, wrapped: usize) -> usize {
        self.marker(MarkerType::CacheAllInCell, wrapped)
    }

    /// Evaluates node `index` at `ctx` with every cache marker passed through.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn evaluate(&self, index: usize, ctx: &FunctionContext) -> f64 {
        DagSampler::new(&self.nodes).sample_at(index, ctx, &SampleOptions::skip_cell_caches())
    }

    /// Evaluates node `index` at every context of `provider`.
    ///
    /// Produces the same values as calling [`Self::evaluate`] per slot.
    pub fn evaluate_batch(&self, index: usize, out: &mut [f64], provider: &dyn ContextProvider) {
        let mut options = SampleOptions::skip_cell_caches();
        DagSampler::new(&self.nodes).fill_at(index, out, provider, &mut options);
    }

    /// Lower bound of node `index` over every context.
    #[must_use]
    pub fn min_value(&self, index: usize) -> f64 {
        self.nodes[index].min_value()
    }

    /// Upper bound of node `index` over every context.
    #[must_use]
    pub fn max_value(&self, index: usize) -> f64 {
        self.nodes[index].max_value()
    }

    /// Rewrites the sub-DAG reachable from `roots` into a fresh arena.
    ///
    /// Each reachable node is visited exactly once, however many parents
    /// share it. Returns the new arena and the new index of every root.
    ///
    /// # Errors
    /// Fails on an out-of-range root or when the visitor fails.
    pub fn rewrite(
        &self,
        roots: &[usize],
        visitor: &mut impl DensityVisitor,
    ) -> Result<(Self, Vec<usize>), DensityError> {
        let mut target = Self::new();
        let mut memo = FxHashMap::default();
        let roots = self.rewrite_into(&mut target, roots, visitor, &mut memo)?;
        Ok((target, roots))
    }

    /// Rewrites the sub-DAG reachable from `roots` into `target`.
    ///
    /// `memo` maps source indices to target indices. Nodes already in it are
    /// reused, so repeated calls with the same memo share every common node.
    ///
    /// # Errors
    /// Fails on an out-of-range root or when the visitor fails.
    pub fn rewrite_into(
        &self,
        target: &mut Self,
        roots: &[usize],
        visitor: &mut impl DensityVisitor,
        memo: &mut FxHashMap<usize, usize>,
    ) -> Result<Vec<usize>, DensityError> {
        let len = self.nodes.len();
        if let Some(&index) = roots.iter().find(|&&index| index >= len) {
            return Err(DensityError::DanglingReference { index, len });
        }

        let mut reachable = vec![false; len];
        let mut pending: Vec<usize> = roots.to_vec();
        while let Some(index) = pending.pop() {
            if reachable[index] || memo.contains_key(&index) {
                continue;
            }
            reachable[index] = true;
            pending.extend(self.nodes[index].inputs());
        }

        let mut visited = 0usize;
        for index in (0..len).filter(|&index| reachable[index]) {
            let mut node = self.nodes[index].clone();
            node.try_map_inputs(&mut |input| {
                memo.get(&input)
                    .copied()
                    .ok_or(DensityError::DanglingReference { index: input, len })
            })?;
            let node = visitor.visit(node)?;
            memo.insert(index, target.try_push(node)?);
            visited += 1;
        }
        log::debug!("rewrote {visited} of {len} density nodes");

        Ok(roots.iter().map(|root| memo[root]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(node: DensityFunction) -> Result<DensityFunction, DensityError> {
        Ok(node)
    }

    #[test]
    fn test_constant_operands_collapse() {
        let mut dag = DensityDag::new();
        let two = dag.constant(2.0);
        let three = dag.constant(3.0);
        let folded = dag.mul(two, three);
        assert_eq!(dag.get(folded).and_then(DensityFunction::as_constant), Some(6.0));

        let y = dag.y_clamped_gradient(0, 10, 0.0, 10.0);
        let scaled = dag.mul(y, two);
        assert!(matches!(dag.get(scaled), Some(DensityFunction::Linear(_))));
        assert_eq!((dag.min_value(scaled), dag.max_value(scaled)), (0.0, 20.0));
    }

    #[test]
    fn test_zero_scale_of_unbounded_input() {
        let mut dag = DensityDag::new();
        let offset = dag.blend_offset();
        let zero = dag.constant(0.0);
        let scaled = dag.mul(offset, zero);
        assert!(matches!(dag.get(scaled), Some(DensityFunction::Linear(_))));
        assert_eq!((dag.min_value(scaled), dag.max_value(scaled)), (0.0, 0.0));

        let gradient = dag.y_clamped_gradient(0, 10, -1.0, 1.0);
        let blended = dag.blend_density(gradient);
        let negative_zero = dag.constant(-0.0);
        let flattened = dag.mul(negative_zero, blended);
        assert_eq!((dag.min_value(flattened), dag.max_value(flattened)), (0.0, 0.0));
    }

    #[test]
    fn test_builder_records_missing_input() {
        let mut dag = DensityDag::new();
        let y = dag.y_clamped_gradient(0, 10, 0.0, 1.0);
        assert_eq!(dag.validate(), Ok(()));

        let bad = dag.add(y, 5);
        let later = dag.abs(9);
        assert_eq!((bad, later), (1, 2));
        assert_eq!(dag.evaluate(bad, &FunctionContext::new(0, 4, 0)), 0.0);
        assert_eq!(dag.validate(), Err(DensityError::DanglingReference { index: 5, len: 1 }));
    }

    #[test]
    fn test_try_push_rejects_forward_reference() {
        let mut dag = DensityDag::new();
        let err = dag
            .try_push(DensityFunction::Mapped(Mapped::new(MappedType::Abs, 0)))
            .unwrap_err();
        assert!(matches!(err, DensityError::DanglingReference { index: 0, len: 0 }));
    }

    #[test]
    fn test_evaluate_matches_batch() {
        let mut dag = DensityDag::new();
        let y = dag.y_clamped_gradient(-64, 64, 1.0, -1.0);
        let a = dag.abs(y);
        let k = dag.constant(0.25);
        let root = dag.max(a, k);

        let contexts: Vec<_> = (-80..80).map(|y| FunctionContext::new(3, y, -7)).collect();
        let mut batch = vec![0.0; contexts.len()];
        dag.evaluate_batch(root, &mut batch, &contexts);
        for (ctx, value) in contexts.iter().zip(batch) {
            assert_eq!(dag.evaluate(root, ctx), value);
        }
    }

    #[test]
    fn test_rewrite_visits_shared_nodes_once() {
        let mut dag = DensityDag::new();
        dag.constant(9.0);
        let shared = dag.y_clamped_gradient(0, 16, 0.0, 1.0);
        let left = dag.abs(shared);
        let right = dag.square(shared);
        let root = dag.add(left, right);

        let mut visits = 0;
        let (rewritten, roots) = dag
            .rewrite(&[root, left], &mut |node: DensityFunction| -> Result<DensityFunction, DensityError> {
                visits += 1;
                Ok(node)
            })
            .unwrap();

        assert_eq!(visits, 4);
        assert_eq!(rewritten.len(), 4);
        let ctx = FunctionContext::new(0, 8, 0);
        assert_eq!(rewritten.evaluate(roots[0], &ctx), dag.evaluate(root, &ctx));
        assert_eq!(rewritten.evaluate(roots[1], &ctx), dag.evaluate(left, &ctx));
    }

    #[test]
    fn test_rewrite_recomputes_ranges() {
        let mut dag = DensityDag::new();
        let base = dag.y_clamped_gradient(0, 16, 0.0, 1.0);
        let root = dag.abs(base);

        let (rewritten, roots) = dag
            .rewrite(&[root], &mut |node: DensityFunction| -> Result<DensityFunction, DensityError> {
                Ok(match node {
                    DensityFunction::YClampedGradient(_) => DensityFunction::Constant(Constant { value: -4.0 }),
                    other => other,
                })
            })
            .unwrap();

        assert_eq!(rewritten.min_value(roots[0]), 4.0);
        assert_eq!(rewritten.max_value(roots[0]), 4.0);
    }

    #[test]
    fn test_rewrite_into_reuses_memo() {
        let mut dag = DensityDag::new();
        let shared = dag.y_clamped_gradient(0, 16, 0.0, 1.0);
        let a = dag.abs(shared);
        let b = dag.cube(shared);

        let mut target = DensityDag::new();
        let mut memo = FxHashMap::default();
        let first = dag.rewrite_into(&mut target, &[a], &mut identity, &mut memo).unwrap();
        let second = dag.rewrite_into(&mut target, &[b], &mut identity, &mut memo).unwrap();

        assert_eq!(target.len(), 3);
        assert_ne!(first[0], second[0]);
    }

    #[test]
    fn test_rewrite_rejects_bad_root() {
        let dag = DensityDag::new();
        let result = dag.rewrite(&[3], &mut identity);
        assert!(matches!(result, Err(DensityError::DanglingReference { index: 3, len: 0 })));
    }
}
