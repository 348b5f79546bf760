//! Density function DAG and its evaluation.
//!
//! Density functions form a directed acyclic graph stored in an arena
//! ([`DensityDag`]). Every node refers to its inputs by index, and inputs always
//! live at lower indices than the nodes that read them. Sharing a sub-expression
//! means sharing an index, so the seed binding rewrite and the per-chunk cache
//! stack can both key their work by node index.
//!
//! Evaluation goes through [`DensityStack`]. The pure evaluator ([`DagSampler`])
//! treats cache markers as pass-through; the per-chunk stack in [`chunk`] swaps
//! them for stateful caches driven by the cell iteration order of a noise chunk.
//!
//! # Key Types
//!
//! - [`DensityFunction`] - the node enum with every operation type
//! - [`DensityDag`] - append-only arena with builder, evaluation and rewrite
//! - [`chunk::ChunkRouter`] - per-chunk component stack with interpolators and caches

pub mod chunk;
mod dag;
mod function;
mod math;
mod misc;
mod noise;
mod spline;

pub use chunk::{Blender, NoBlending, SampleAction, SampleOptions};
pub use dag::{DensityDag, DensityVisitor};
pub use function::DensityFunction;
pub use math::{Clamp, Constant, Linear, LinearType, Mapped, MappedType, TwoArgType, TwoArgumentSimple};
pub use misc::{
    BlendAlpha, BlendDensity, BlendOffset, EndIslandsFunction, Marker, MarkerType, RangeChoice,
    RarityValueMapper, Reference, WeirdScaledSampler, YClampedGradient,
};
pub use noise::{BlendedNoiseFunction, Noise, NoiseHolder, Shift, ShiftA, ShiftB, ShiftedNoise};
pub use spline::{CubicSpline, SplineFunction, SplinePoint, SplineValue};

/// A block position at which a density function is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FunctionContext {
    /// Block X.
    pub block_x: i32,
    /// Block Y.
    pub block_y: i32,
    /// Block Z.
    pub block_z: i32,
}

impl FunctionContext {
    /// Creates a context at a block position.
    #[must_use]
    pub const fn new(block_x: i32, block_y: i32, block_z: i32) -> Self {
        Self {
            block_x,
            block_y,
            block_z,
        }
    }
}

/// Maps the linear index of a batch fill to the context it samples.
///
/// Providers driven by a noise chunk also advance the cache bookkeeping in
/// the sample options, which is why they receive them mutably.
pub trait ContextProvider {
    /// Context for batch slot `index`.
    fn at(&self, index: usize, options: Option<&mut SampleOptions>) -> FunctionContext;
}

impl ContextProvider for Vec<FunctionContext> {
    fn at(&self, index: usize, _options: Option<&mut SampleOptions>) -> FunctionContext {
        self[index]
    }
}

/// Evaluates DAG nodes by index.
///
/// Node variants are written once against this trait. The pure evaluator
/// reads the arena directly; the chunk stack substitutes caches for markers.
pub trait DensityStack {
    /// Samples node `index` at `ctx`.
    fn sample_at(&mut self, index: usize, ctx: &FunctionContext, options: &SampleOptions) -> f64;

    /// Fills `out` with node `index` sampled at every context of `provider`.
    fn fill_at(
        &mut self,
        index: usize,
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    );

    /// Lower bound of node `index`.
    fn min_at(&self, index: usize) -> f64;

    /// Upper bound of node `index`.
    fn max_at(&self, index: usize) -> f64;
}

/// Side-effect free evaluator over an arena of nodes.
#[derive(Clone, Copy)]
pub struct DagSampler<'a> {
    nodes: &'a [DensityFunction],
}

impl<'a> DagSampler<'a> {
    /// Wraps a topologically ordered node slice.
    #[must_use]
    pub const fn new(nodes: &'a [DensityFunction]) -> Self {
        Self { nodes }
    }
}

impl DensityStack for DagSampler<'_> {
    #[inline]
    fn sample_at(&mut self, index: usize, ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        let nodes = self.nodes;
        nodes[index].sample(self, ctx, options)
    }

    fn fill_at(
        &mut self,
        index: usize,
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        let nodes = self.nodes;
        nodes[index].fill(self, out, provider, options);
    }

    #[inline]
    fn min_at(&self, index: usize) -> f64 {
        self.nodes[index].min_value()
    }

    #[inline]
    fn max_at(&self, index: usize) -> f64 {
        self.nodes[index].max_value()
    }
}

/// Samples `sample` once per batch slot, letting the provider update `options`.
pub(crate) fn fill_each(
    out: &mut [f64],
    provider: &dyn ContextProvider,
    options: &mut SampleOptions,
    mut sample: impl FnMut(&FunctionContext, &SampleOptions) -> f64,
) {
    for (index, value) in out.iter_mut().enumerate() {
        let ctx = provider.at(index, Some(options));
        *value = sample(&ctx, options);
    }
}
