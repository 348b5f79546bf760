//! Per-chunk density evaluation with interpolation and caches.
//!
//! A [`ChunkRouter`] mirrors a seed-bound [`DensityDag`] index for index. Plain
//! nodes are borrowed from the DAG; cache markers and blend nodes become owned,
//! stateful components. Because every input sits below its reader, a component
//! only ever sees the slice beneath it, which lets caches mutate themselves
//! while sampling their inputs.
//!
//! The caches are only correct when contexts are visited in the order a noise
//! chunk walks them: cell columns along X, then Z, cells from the top down,
//! and blocks inside a cell from the top down, then X, then Z.

use std::mem;

use enum_dispatch::enum_dispatch;

use super::misc::MarkerType;
use super::{ContextProvider, DensityDag, DensityFunction, DensityStack, FunctionContext, fill_each};
use crate::math::{lerp, lerp3};

/// Block to biome (quart) coordinate.
#[inline]
#[must_use]
pub const fn biome_from_block(coord: i32) -> i32 {
    coord >> 2
}

/// Biome (quart) to block coordinate.
#[inline]
#[must_use]
pub const fn biome_to_block(coord: i32) -> i32 {
    coord << 2
}

/// Packs a column into one key, matching vanilla `ChunkPos.asLong`.
#[inline]
#[must_use]
pub const fn packed_column(x: i32, z: i32) -> u64 {
    (x as u32 as u64) | ((z as u32 as u64) << 32)
}

/// Column key no cache has seen yet. Vanilla uses the same real position.
const COLUMN_MARKER: u64 = packed_column(1_875_066, 1_875_066);

/// Position of the current block inside its cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellOffsets {
    /// Block offset along X inside the cell.
    pub x: usize,
    /// Block offset along Y inside the cell.
    pub y: usize,
    /// Block offset along Z inside the cell.
    pub z: usize,
    horizontal_cell_blocks: usize,
    vertical_cell_blocks: usize,
    x_delta: f64,
    y_delta: f64,
    z_delta: f64,
}

impl CellOffsets {
    /// Offsets inside a cell of the given size.
    #[must_use]
    pub fn new(x: usize, y: usize, z: usize, horizontal_cell_blocks: usize, vertical_cell_blocks: usize) -> Self {
        Self {
            x,
            y,
            z,
            horizontal_cell_blocks,
            vertical_cell_blocks,
            x_delta: x as f64 / horizontal_cell_blocks as f64,
            y_delta: y as f64 / vertical_cell_blocks as f64,
            z_delta: z as f64 / horizontal_cell_blocks as f64,
        }
    }

    /// Moves to another block of the same cell.
    pub fn update(&mut self, x: usize, y: usize, z: usize) {
        if x != self.x {
            self.x = x;
            self.x_delta = x as f64 / self.horizontal_cell_blocks as f64;
        }
        if y != self.y {
            self.y = y;
            self.y_delta = y as f64 / self.vertical_cell_blocks as f64;
        }
        if z != self.z {
            self.z = z;
            self.z_delta = z as f64 / self.horizontal_cell_blocks as f64;
        }
    }

    const fn cell_cache_index(&self) -> usize {
        ((self.vertical_cell_blocks - 1 - self.y) * self.horizontal_cell_blocks + self.x)
            * self.horizontal_cell_blocks
            + self.z
    }
}

/// Whether a sample may be served by cell-scoped caches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleAction {
    /// Evaluate through every cell cache and interpolator.
    SkipCellCaches,
    /// Serve from cell caches at these in-cell offsets.
    CellCaches(CellOffsets),
}

/// Cursor state passed down the component stack with each sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    /// Set while cell caches are being filled; interpolators then compute
    /// their trilinear value from the offsets instead of the per-block result.
    pub populating_caches: bool,
    /// Cell cache policy.
    pub action: SampleAction,
    /// Changes whenever the sampled context changes.
    pub cache_result_id: u64,
    /// Changes whenever a new batch fill starts.
    pub cache_fill_id: u64,
    /// Slot of the batch fill currently being sampled.
    pub fill_index: usize,
}

impl SampleOptions {
    /// Creates sample options.
    #[must_use]
    pub const fn new(
        populating_caches: bool,
        action: SampleAction,
        cache_result_id: u64,
        cache_fill_id: u64,
        fill_index: usize,
    ) -> Self {
        Self {
            populating_caches,
            action,
            cache_result_id,
            cache_fill_id,
            fill_index,
        }
    }

    /// Options that bypass every cell cache.
    #[must_use]
    pub const fn skip_cell_caches() -> Self {
        Self::new(false, SampleAction::SkipCellCaches, 0, 0, 0)
    }
}

/// Shape of the chunk a [`ChunkRouter`] is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBuildOptions {
    /// Blocks per cell along X and Z.
    pub horizontal_cell_blocks: usize,
    /// Blocks per cell along Y.
    pub vertical_cell_blocks: usize,
    /// Cells along Y.
    pub vertical_cell_count: usize,
    /// Cells along X and Z.
    pub horizontal_cell_count: usize,
    /// Biome X of the first column.
    pub start_biome_x: i32,
    /// Biome Z of the first column.
    pub start_biome_z: i32,
    /// Last biome offset covered by flat caches.
    pub horizontal_biome_end: usize,
}

/// Alpha and offset supplied by a [`Blender`] for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendingOutput {
    /// Weight of freshly generated terrain, 1 means no blending.
    pub alpha: f64,
    /// Offset applied to the terrain shape.
    pub blending_offset: f64,
}

/// Blends new terrain into chunks generated by older versions.
pub trait Blender: Send + Sync {
    /// Alpha and offset for a block column.
    fn blend_offset_and_factor(&self, block_x: i32, block_z: i32) -> BlendingOutput;

    /// Adjusts a final density value.
    fn blend_density(&self, ctx: &FunctionContext, density: f64) -> f64;
}

/// The blender used when no old terrain borders the chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlending;

impl Blender for NoBlending {
    fn blend_offset_and_factor(&self, _block_x: i32, _block_z: i32) -> BlendingOutput {
        BlendingOutput {
            alpha: 1.0,
            blending_offset: 0.0,
        }
    }

    fn blend_density(&self, _ctx: &FunctionContext, density: f64) -> f64 {
        density
    }
}

/// Bounds of a chunk component.
#[enum_dispatch]
pub trait ComponentRange {
    /// Lower bound.
    fn min(&self) -> f64;
    /// Upper bound.
    fn max(&self) -> f64;
}

/// Sampling of a stateful chunk cache.
#[enum_dispatch]
pub trait ChunkCacheImpl {
    /// Samples the cache, falling back to `stack` when needed.
    fn sample(&mut self, stack: &mut [ChunkComponent<'_>], ctx: &FunctionContext, options: &SampleOptions) -> f64;

    /// Fills `out` one slot at a time.
    fn fill(
        &mut self,
        stack: &mut [ChunkComponent<'_>],
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        fill_each(out, provider, options, |ctx, options| self.sample(stack, ctx, options));
    }
}

macro_rules! component_range {
    ($name:ident) => {
        impl ComponentRange for $name {
            #[inline]
            fn min(&self) -> f64 {
                self.min_value
            }

            #[inline]
            fn max(&self) -> f64 {
                self.max_value
            }
        }
    };
}

/// Trilinear interpolator over cell corner values.
///
/// Two Y-Z planes of corner values are kept, at the start and end X of the
/// current cell column. The noise chunk fills them, selects a cell, then
/// narrows the eight corners down along Y, X and Z.
pub struct DensityInterpolator {
    pub(crate) input: usize,
    pub(crate) start_buffer: Box<[f64]>,
    pub(crate) end_buffer: Box<[f64]>,
    first_pass: [f64; 8],
    second_pass: [f64; 4],
    third_pass: [f64; 2],
    result: f64,
    pub(crate) vertical_cell_count: usize,
    min_value: f64,
    max_value: f64,
}

component_range!(DensityInterpolator);

impl DensityInterpolator {
    fn new(input: usize, min_value: f64, max_value: f64, options: &ChunkBuildOptions) -> Self {
        let len = (options.vertical_cell_count + 1) * (options.horizontal_cell_count + 1);
        Self {
            input,
            start_buffer: vec![0.0; len].into_boxed_slice(),
            end_buffer: vec![0.0; len].into_boxed_slice(),
            first_pass: [0.0; 8],
            second_pass: [0.0; 4],
            third_pass: [0.0; 2],
            result: 0.0,
            vertical_cell_count: options.vertical_cell_count,
            min_value,
            max_value,
        }
    }

    #[inline]
    pub(crate) const fn yz_to_buf_index(&self, cell_y: usize, cell_z: usize) -> usize {
        cell_z * (self.vertical_cell_count + 1) + cell_y
    }

    fn on_sampled_cell_corners(&mut self, cell_y: usize, cell_z: usize) {
        let (y0z0, y0z1) = (self.yz_to_buf_index(cell_y, cell_z), self.yz_to_buf_index(cell_y, cell_z + 1));
        let (y1z0, y1z1) = (
            self.yz_to_buf_index(cell_y + 1, cell_z),
            self.yz_to_buf_index(cell_y + 1, cell_z + 1),
        );
        self.first_pass = [
            self.start_buffer[y0z0],
            self.start_buffer[y0z1],
            self.start_buffer[y1z0],
            self.start_buffer[y1z1],
            self.end_buffer[y0z0],
            self.end_buffer[y0z1],
            self.end_buffer[y1z0],
            self.end_buffer[y1z1],
        ];
    }

    fn interpolate_y(&mut self, delta: f64) {
        let p = &self.first_pass;
        self.second_pass = [
            lerp(delta, p[0], p[2]),
            lerp(delta, p[1], p[3]),
            lerp(delta, p[4], p[6]),
            lerp(delta, p[5], p[7]),
        ];
    }

    fn interpolate_x(&mut self, delta: f64) {
        self.third_pass[0] = lerp(delta, self.second_pass[0], self.second_pass[2]);
        self.third_pass[1] = lerp(delta, self.second_pass[1], self.second_pass[3]);
    }

    fn interpolate_z(&mut self, delta: f64) {
        self.result = lerp(delta, self.third_pass[0], self.third_pass[1]);
    }

    fn swap_buffers(&mut self) {
        mem::swap(&mut self.start_buffer, &mut self.end_buffer);
    }
}

impl ChunkCacheImpl for DensityInterpolator {
    fn sample(&mut self, stack: &mut [ChunkComponent<'_>], ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        match &options.action {
            SampleAction::CellCaches(offsets) => {
                if options.populating_caches {
                    let p = &self.first_pass;
                    lerp3(
                        offsets.x_delta,
                        offsets.y_delta,
                        offsets.z_delta,
                        p[0],
                        p[4],
                        p[2],
                        p[6],
                        p[1],
                        p[5],
                        p[3],
                        p[7],
                    )
                } else {
                    self.result
                }
            }
            SampleAction::SkipCellCaches => stack.sample_at(self.input, ctx, options),
        }
    }

    fn fill(
        &mut self,
        stack: &mut [ChunkComponent<'_>],
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        if options.populating_caches {
            fill_each(out, provider, options, |ctx, options| self.sample(stack, ctx, options));
        } else {
            stack.fill_at(self.input, out, provider, options);
        }
    }
}

/// Biome-resolution cache prefilled over the whole chunk at Y = 0.
pub struct FlatCache {
    input: usize,
    cache: Box<[f64]>,
    start_biome_x: i32,
    start_biome_z: i32,
    horizontal_biome_end: usize,
    min_value: f64,
    max_value: f64,
}

component_range!(FlatCache);

impl FlatCache {
    fn new(input: usize, min_value: f64, max_value: f64, options: &ChunkBuildOptions) -> Self {
        let side = options.horizontal_biome_end + 1;
        Self {
            input,
            cache: vec![0.0; side * side].into_boxed_slice(),
            start_biome_x: options.start_biome_x,
            start_biome_z: options.start_biome_z,
            horizontal_biome_end: options.horizontal_biome_end,
            min_value,
            max_value,
        }
    }

    #[inline]
    const fn xz_to_index(&self, biome_x: usize, biome_z: usize) -> usize {
        biome_x * (self.horizontal_biome_end + 1) + biome_z
    }

    fn prefill(&mut self, stack: &mut [ChunkComponent<'_>]) {
        let options = SampleOptions::skip_cell_caches();
        for biome_x in 0..=self.horizontal_biome_end {
            let block_x = biome_to_block(self.start_biome_x + biome_x as i32);
            for biome_z in 0..=self.horizontal_biome_end {
                let block_z = biome_to_block(self.start_biome_z + biome_z as i32);
                let ctx = FunctionContext::new(block_x, 0, block_z);
                let index = self.xz_to_index(biome_x, biome_z);
                self.cache[index] = stack.sample_at(self.input, &ctx, &options);
            }
        }
    }
}

impl ChunkCacheImpl for FlatCache {
    fn sample(&mut self, stack: &mut [ChunkComponent<'_>], ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        let biome_x = biome_from_block(ctx.block_x) - self.start_biome_x;
        let biome_z = biome_from_block(ctx.block_z) - self.start_biome_z;
        let end = self.horizontal_biome_end as i32;
        if (0..=end).contains(&biome_x) && (0..=end).contains(&biome_z) {
            self.cache[self.xz_to_index(biome_x as usize, biome_z as usize)]
        } else {
            stack.sample_at(self.input, ctx, options)
        }
    }
}

/// Remembers the last sampled column.
pub struct Cache2D {
    input: usize,
    last_column: u64,
    last_value: f64,
    min_value: f64,
    max_value: f64,
}

component_range!(Cache2D);

impl Cache2D {
    const fn new(input: usize, min_value: f64, max_value: f64) -> Self {
        Self {
            input,
            last_column: COLUMN_MARKER,
            last_value: 0.0,
            min_value,
            max_value,
        }
    }
}

impl ChunkCacheImpl for Cache2D {
    fn sample(&mut self, stack: &mut [ChunkComponent<'_>], ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        let column = packed_column(ctx.block_x, ctx.block_z);
        if column != self.last_column {
            self.last_value = stack.sample_at(self.input, ctx, options);
            self.last_column = column;
        }
        self.last_value
    }
}

/// Remembers the value of the current context and of the current fill.
pub struct CacheOnce {
    input: usize,
    cache_result_id: u64,
    cache_fill_id: u64,
    last_value: f64,
    cache: Box<[f64]>,
    min_value: f64,
    max_value: f64,
}

component_range!(CacheOnce);

impl CacheOnce {
    fn new(input: usize, min_value: f64, max_value: f64) -> Self {
        Self {
            input,
            cache_result_id: 0,
            cache_fill_id: 0,
            last_value: 0.0,
            cache: Box::default(),
            min_value,
            max_value,
        }
    }
}

impl ChunkCacheImpl for CacheOnce {
    fn sample(&mut self, stack: &mut [ChunkComponent<'_>], ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        match options.action {
            SampleAction::CellCaches(_) => {
                if self.cache_fill_id == options.cache_fill_id && !self.cache.is_empty() {
                    self.cache[options.fill_index]
                } else if self.cache_result_id == options.cache_result_id {
                    self.last_value
                } else {
                    let value = stack.sample_at(self.input, ctx, options);
                    self.cache_result_id = options.cache_result_id;
                    self.last_value = value;
                    value
                }
            }
            SampleAction::SkipCellCaches => stack.sample_at(self.input, ctx, options),
        }
    }

    fn fill(
        &mut self,
        stack: &mut [ChunkComponent<'_>],
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        if self.cache_fill_id == options.cache_fill_id && !self.cache.is_empty() {
            out.copy_from_slice(&self.cache);
            return;
        }
        stack.fill_at(self.input, out, provider, options);
        if self.cache.len() != out.len() {
            self.cache = vec![0.0; out.len()].into_boxed_slice();
        }
        self.cache.copy_from_slice(out);
        self.cache_fill_id = options.cache_fill_id;
    }
}

/// Holds every block value of the current cell.
pub struct CellCache {
    pub(crate) input: usize,
    pub(crate) cache: Box<[f64]>,
    min_value: f64,
    max_value: f64,
}

component_range!(CellCache);

impl CellCache {
    fn new(input: usize, min_value: f64, max_value: f64, options: &ChunkBuildOptions) -> Self {
        let len = options.horizontal_cell_blocks * options.horizontal_cell_blocks * options.vertical_cell_blocks;
        Self {
            input,
            cache: vec![0.0; len].into_boxed_slice(),
            min_value,
            max_value,
        }
    }
}

impl ChunkCacheImpl for CellCache {
    fn sample(&mut self, stack: &mut [ChunkComponent<'_>], ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        match &options.action {
            SampleAction::CellCaches(offsets) => self.cache[offsets.cell_cache_index()],
            SampleAction::SkipCellCaches => stack.sample_at(self.input, ctx, options),
        }
    }
}

/// A stateful per-chunk replacement for a cache marker.
#[enum_dispatch(ChunkCacheImpl, ComponentRange)]
pub enum ChunkCache {
    /// Replaces [`MarkerType::Interpolated`].
    DensityInterpolator(DensityInterpolator),
    /// Replaces [`MarkerType::FlatCache`].
    FlatCache(FlatCache),
    /// Replaces [`MarkerType::Cache2D`].
    Cache2D(Cache2D),
    /// Replaces [`MarkerType::CacheOnce`].
    CacheOnce(CacheOnce),
    /// Replaces [`MarkerType::CacheAllInCell`].
    CellCache(CellCache),
}

struct ColumnMemo {
    last_column: u64,
    last_value: BlendingOutput,
}

impl ColumnMemo {
    const fn new() -> Self {
        Self {
            last_column: COLUMN_MARKER,
            last_value: BlendingOutput {
                alpha: 1.0,
                blending_offset: 0.0,
            },
        }
    }

    fn get(&mut self, blender: &dyn Blender, ctx: &FunctionContext) -> BlendingOutput {
        let column = packed_column(ctx.block_x, ctx.block_z);
        if column != self.last_column {
            self.last_value = blender.blend_offset_and_factor(ctx.block_x, ctx.block_z);
            self.last_column = column;
        }
        self.last_value
    }
}

/// Column-cached blend alpha.
pub struct BlendAlphaCache<'a> {
    blender: &'a dyn Blender,
    memo: ColumnMemo,
}

/// Column-cached blend offset.
pub struct BlendOffsetCache<'a> {
    blender: &'a dyn Blender,
    memo: ColumnMemo,
}

/// Passes the input density through the blender.
pub struct BlendDensityCache<'a> {
    blender: &'a dyn Blender,
    input: usize,
}

/// Blend nodes bound to the chunk's [`Blender`].
pub enum BlendComponent<'a> {
    /// Replaces a blend alpha node.
    Alpha(BlendAlphaCache<'a>),
    /// Replaces a blend offset node.
    Offset(BlendOffsetCache<'a>),
    /// Replaces a blend density node.
    Density(BlendDensityCache<'a>),
}

impl BlendComponent<'_> {
    fn sample(&mut self, stack: &mut [ChunkComponent<'_>], ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        match self {
            Self::Alpha(cache) => cache.memo.get(cache.blender, ctx).alpha,
            Self::Offset(cache) => cache.memo.get(cache.blender, ctx).blending_offset,
            Self::Density(cache) => {
                let density = stack.sample_at(cache.input, ctx, options);
                cache.blender.blend_density(ctx, density)
            }
        }
    }

    const fn range(&self) -> (f64, f64) {
        match self {
            Self::Alpha(_) => (0.0, 1.0),
            Self::Offset(_) | Self::Density(_) => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

/// One entry of the per-chunk component stack.
pub enum ChunkComponent<'a> {
    /// A stateless node shared with the DAG.
    Static(&'a DensityFunction),
    /// A cache replacing a marker.
    Cache(ChunkCache),
    /// A blend node bound to the chunk's blender.
    Blend(BlendComponent<'a>),
}

#[inline]
fn split_component<'s, 'a>(
    stack: &'s mut [ChunkComponent<'a>],
    index: usize,
) -> (&'s mut [ChunkComponent<'a>], &'s mut ChunkComponent<'a>) {
    let (below, rest) = stack.split_at_mut(index);
    (below, &mut rest[0])
}

impl DensityStack for [ChunkComponent<'_>] {
    #[inline]
    fn sample_at(&mut self, index: usize, ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        let (below, component) = split_component(self, index);
        match component {
            ChunkComponent::Static(function) => function.sample(below, ctx, options),
            ChunkComponent::Cache(cache) => cache.sample(below, ctx, options),
            ChunkComponent::Blend(blend) => blend.sample(below, ctx, options),
        }
    }

    fn fill_at(
        &mut self,
        index: usize,
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        let (below, component) = split_component(self, index);
        match component {
            ChunkComponent::Static(function) => function.fill(below, out, provider, options),
            ChunkComponent::Cache(cache) => cache.fill(below, out, provider, options),
            ChunkComponent::Blend(blend) => {
                fill_each(out, provider, options, |ctx, options| blend.sample(below, ctx, options));
            }
        }
    }

    fn min_at(&self, index: usize) -> f64 {
        match &self[index] {
            ChunkComponent::Static(function) => function.min_value(),
            ChunkComponent::Cache(cache) => cache.min(),
            ChunkComponent::Blend(blend) => blend.range().0,
        }
    }

    fn max_at(&self, index: usize) -> f64 {
        match &self[index] {
            ChunkComponent::Static(function) => function.max_value(),
            ChunkComponent::Cache(cache) => cache.max(),
            ChunkComponent::Blend(blend) => blend.range().1,
        }
    }
}

/// Corner column of an interpolation cell: batch slot `i` is cell Y `i`.
pub struct CornerColumn {
    /// Block X of the column.
    pub block_x: i32,
    /// Block Z of the column.
    pub block_z: i32,
    /// Lowest cell Y of the chunk.
    pub min_cell_y: i32,
    /// Blocks per cell along Y.
    pub vertical_cell_blocks: i32,
}

impl ContextProvider for CornerColumn {
    fn at(&self, index: usize, options: Option<&mut SampleOptions>) -> FunctionContext {
        if let Some(options) = options {
            options.cache_result_id += 1;
            options.fill_index = index;
        }
        let block_y = (index as i32 + self.min_cell_y) * self.vertical_cell_blocks;
        FunctionContext::new(self.block_x, block_y, self.block_z)
    }
}

/// Every block of one cell, top layer first, then X, then Z.
pub struct CellBlocks {
    /// Block X of the cell origin.
    pub start_x: i32,
    /// Block Y of the cell origin.
    pub start_y: i32,
    /// Block Z of the cell origin.
    pub start_z: i32,
    /// Blocks per cell along X and Z.
    pub horizontal_cell_blocks: usize,
    /// Blocks per cell along Y.
    pub vertical_cell_blocks: usize,
}

impl ContextProvider for CellBlocks {
    fn at(&self, index: usize, options: Option<&mut SampleOptions>) -> FunctionContext {
        let z = index % self.horizontal_cell_blocks;
        let xy = index / self.horizontal_cell_blocks;
        let x = xy % self.horizontal_cell_blocks;
        let y = self.vertical_cell_blocks - 1 - xy / self.horizontal_cell_blocks;

        if let Some(options) = options {
            options.fill_index = index;
            if let SampleAction::CellCaches(offsets) = &mut options.action {
                offsets.update(x, y, z);
            }
        }

        FunctionContext::new(
            self.start_x + x as i32,
            self.start_y + y as i32,
            self.start_z + z as i32,
        )
    }
}

/// The per-chunk component stack of a seed-bound DAG.
pub struct ChunkRouter<'a> {
    components: Box<[ChunkComponent<'a>]>,
    interpolators: Box<[usize]>,
    cell_caches: Box<[usize]>,
}

impl<'a> ChunkRouter<'a> {
    /// Builds the component stack for one chunk.
    ///
    /// Flat caches are filled here, so building costs one evaluation of each
    /// flat-cached node per biome column.
    #[must_use]
    pub fn generate(dag: &'a DensityDag, options: &ChunkBuildOptions, blender: &'a dyn Blender) -> Self {
        let mut components: Vec<ChunkComponent<'a>> = Vec::with_capacity(dag.len());
        let mut interpolators = Vec::new();
        let mut cell_caches = Vec::new();

        for (index, function) in dag.nodes().iter().enumerate() {
            let component = match function {
                DensityFunction::Marker(marker) => {
                    let (input, min, max) = (marker.wrapped, marker.min_value, marker.max_value);
                    let cache = match marker.kind {
                        MarkerType::Interpolated => {
                            interpolators.push(index);
                            ChunkCache::from(DensityInterpolator::new(input, min, max, options))
                        }
                        MarkerType::FlatCache => {
                            let mut cache = FlatCache::new(input, min, max, options);
                            cache.prefill(&mut components);
                            ChunkCache::from(cache)
                        }
                        MarkerType::Cache2D => ChunkCache::from(Cache2D::new(input, min, max)),
                        MarkerType::CacheOnce => ChunkCache::from(CacheOnce::new(input, min, max)),
                        MarkerType::CacheAllInCell => {
                            cell_caches.push(index);
                            ChunkCache::from(CellCache::new(input, min, max, options))
                        }
                    };
                    ChunkComponent::Cache(cache)
                }
                DensityFunction::BlendAlpha(_) => ChunkComponent::Blend(BlendComponent::Alpha(BlendAlphaCache {
                    blender,
                    memo: ColumnMemo::new(),
                })),
                DensityFunction::BlendOffset(_) => ChunkComponent::Blend(BlendComponent::Offset(BlendOffsetCache {
                    blender,
                    memo: ColumnMemo::new(),
                })),
                DensityFunction::BlendDensity(blend) => ChunkComponent::Blend(BlendComponent::Density(
                    BlendDensityCache {
                        blender,
                        input: blend.input,
                    },
                )),
                _ => ChunkComponent::Static(function),
            };
            components.push(component);
        }

        Self {
            components: components.into_boxed_slice(),
            interpolators: interpolators.into_boxed_slice(),
            cell_caches: cell_caches.into_boxed_slice(),
        }
    }

    /// Samples node `index` through the chunk caches.
    #[inline]
    pub fn sample(&mut self, index: usize, ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        self.components.sample_at(index, ctx, options)
    }

    /// Batch-samples node `index` through the chunk caches.
    pub fn fill(
        &mut self,
        index: usize,
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        self.components.fill_at(index, out, provider, options);
    }

    /// Number of interpolated nodes.
    #[must_use]
    pub fn interpolator_count(&self) -> usize {
        self.interpolators.len()
    }

    /// Fills every cell cache for the selected cell.
    pub fn fill_cell_caches(&mut self, provider: &dyn ContextProvider, options: &mut SampleOptions) {
        for &index in &self.cell_caches {
            let (below, component) = split_component(&mut self.components, index);
            let ChunkComponent::Cache(ChunkCache::CellCache(cell_cache)) = component else {
                continue;
            };
            below.fill_at(cell_cache.input, &mut cell_cache.cache, provider, options);
        }
    }

    /// Fills one Z column of corner values into the start or end plane.
    pub fn fill_interpolator_buffers(
        &mut self,
        start: bool,
        cell_z: usize,
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        for &index in &self.interpolators {
            let (below, component) = split_component(&mut self.components, index);
            let ChunkComponent::Cache(ChunkCache::DensityInterpolator(interpolator)) = component else {
                continue;
            };
            let first = interpolator.yz_to_buf_index(0, cell_z);
            let last = first + interpolator.vertical_cell_count;
            let input = interpolator.input;
            let buffer = if start {
                &mut interpolator.start_buffer[first..=last]
            } else {
                &mut interpolator.end_buffer[first..=last]
            };
            below.fill_at(input, buffer, provider, options);
        }
    }

    fn for_each_interpolator(&mut self, mut action: impl FnMut(&mut DensityInterpolator)) {
        for &index in &self.interpolators {
            if let ChunkComponent::Cache(ChunkCache::DensityInterpolator(interpolator)) = &mut self.components[index] {
                action(interpolator);
            }
        }
    }

    /// Loads the eight corners of the selected cell.
    pub fn on_sampled_cell_corners(&mut self, cell_y: usize, cell_z: usize) {
        self.for_each_interpolator(|i| i.on_sampled_cell_corners(cell_y, cell_z));
    }

    /// Interpolates the corners along Y.
    pub fn interpolate_y(&mut self, delta: f64) {
        self.for_each_interpolator(|i| i.interpolate_y(delta));
    }

    /// Interpolates along X.
    pub fn interpolate_x(&mut self, delta: f64) {
        self.for_each_interpolator(|i| i.interpolate_x(delta));
    }

    /// Interpolates along Z, producing the per-block result.
    pub fn interpolate_z(&mut self, delta: f64) {
        self.for_each_interpolator(|i| i.interpolate_z(delta));
    }

    /// Makes the end plane the next start plane.
    pub fn swap_buffers(&mut self) {
        self.for_each_interpolator(DensityInterpolator::swap_buffers);
    }
}
