//! Cell-by-cell evaluation of a seed-bound router over one chunk.
//!
//! A [`NoiseChunk`] walks the chunk in interpolation cells. For each column
//! of cells along X it samples the corner values of every interpolated node
//! into two Y-Z planes, then for each cell it narrows the eight corners down
//! to single blocks. Blocks are visited in a fixed order and the chunk caches
//! depend on it:
//!
//! ```text
//! initialize_for_first_cell_x()
//! for cell_x:
//!     advance_cell_x(cell_x)
//!     for cell_z:
//!         for cell_y (top down):
//!             select_cell_yz(cell_y, cell_z)
//!             for y in cell (top down):
//!                 update_for_y(y, fy)
//!                 for x in cell:
//!                     update_for_x(x, fx)
//!                     for z in cell:
//!                         update_for_z(z, fz)
//!                         get_interpolated_state()
//!     swap_slices()
//! stop_interpolation()
//! ```

use rustc_hash::FxHashMap;
use steel_density::density::chunk::{
    CellBlocks, CellOffsets, ChunkBuildOptions, ChunkRouter, CornerColumn, biome_from_block, biome_to_block,
    packed_column,
};
use steel_density::density::{Blender, FunctionContext, SampleAction, SampleOptions};
use steel_density::math::{floor, floor_div};
use steel_density::router::NoiseRouter;
use steel_density::{BlockStateId, NoiseGeneratorSettings, NoiseSettings, RandomState};

use crate::worldgen::aquifer::{GlobalFluidPicker, SeaLevelAquifer};
use crate::worldgen::ore_veinifier::OreVeinifier;

/// Interpolation state of one chunk.
pub struct NoiseChunk<'a> {
    router: ChunkRouter<'a>,
    roots: &'a NoiseRouter,
    aquifer: SeaLevelAquifer,
    ore_veinifier: Option<OreVeinifier>,
    cell_width: i32,
    cell_height: i32,
    cell_count_xz: i32,
    cell_noise_min_y: i32,
    first_cell_x: i32,
    first_cell_z: i32,
    cell_start_block_x: i32,
    cell_start_block_y: i32,
    cell_start_block_z: i32,
    in_cell_x: i32,
    in_cell_y: i32,
    in_cell_z: i32,
    interpolating: bool,
    cache_result_id: u64,
    cache_fill_id: u64,
    preliminary_surface_levels: FxHashMap<u64, i32>,
}

impl<'a> NoiseChunk<'a> {
    /// Builds the interpolation state for `cell_count_xz` cells along X and Z,
    /// starting at block `(min_block_x, min_block_z)`.
    #[must_use]
    pub fn new(
        cell_count_xz: i32,
        random_state: &'a RandomState,
        min_block_x: i32,
        min_block_z: i32,
        noise_settings: &NoiseSettings,
        settings: &NoiseGeneratorSettings,
        blender: &'a dyn Blender,
    ) -> Self {
        let cell_width = noise_settings.cell_width();
        let cell_height = noise_settings.cell_height();
        let cell_count_y = noise_settings.cell_count_y();
        let roots = random_state.router();

        let options = ChunkBuildOptions {
            horizontal_cell_blocks: cell_width as usize,
            vertical_cell_blocks: cell_height as usize,
            vertical_cell_count: cell_count_y.max(0) as usize,
            horizontal_cell_count: cell_count_xz as usize,
            start_biome_x: biome_from_block(min_block_x),
            start_biome_z: biome_from_block(min_block_z),
            horizontal_biome_end: biome_from_block(cell_count_xz * cell_width) as usize,
        };

        Self {
            router: ChunkRouter::generate(&roots.dag, &options, blender),
            roots,
            aquifer: SeaLevelAquifer::new(GlobalFluidPicker::new(settings.sea_level, settings.default_fluid)),
            ore_veinifier: settings
                .ore_veins_enabled
                .then(|| OreVeinifier::new(*random_state.ore_random())),
            cell_width,
            cell_height,
            cell_count_xz,
            cell_noise_min_y: floor_div(noise_settings.min_y, cell_height),
            first_cell_x: floor_div(min_block_x, cell_width),
            first_cell_z: floor_div(min_block_z, cell_width),
            cell_start_block_x: 0,
            cell_start_block_y: 0,
            cell_start_block_z: 0,
            in_cell_x: 0,
            in_cell_y: 0,
            in_cell_z: 0,
            interpolating: false,
            cache_result_id: 0,
            cache_fill_id: 0,
            preliminary_surface_levels: FxHashMap::default(),
        }
    }

    /// Blocks per cell along X and Z.
    #[must_use]
    pub const fn cell_width(&self) -> i32 {
        self.cell_width
    }

    /// Blocks per cell along Y.
    #[must_use]
    pub const fn cell_height(&self) -> i32 {
        self.cell_height
    }

    /// Whether the cell caches are live.
    #[must_use]
    pub const fn is_interpolating(&self) -> bool {
        self.interpolating
    }

    /// Samples the first corner plane. Starts interpolation.
    pub fn initialize_for_first_cell_x(&mut self) {
        self.interpolating = true;
        self.cache_result_id = 0;
        self.fill_slice(true, self.first_cell_x);
    }

    /// Samples the far corner plane of cell column `cell_x_index`.
    pub fn advance_cell_x(&mut self, cell_x_index: i32) {
        self.fill_slice(false, self.first_cell_x + cell_x_index + 1);
        self.cell_start_block_x = (self.first_cell_x + cell_x_index) * self.cell_width;
    }

    fn fill_slice(&mut self, start: bool, cell_x: i32) {
        let block_x = cell_x * self.cell_width;
        for cell_z_index in 0..=self.cell_count_xz {
            let block_z = (self.first_cell_z + cell_z_index) * self.cell_width;
            self.cache_fill_id += 1;
            let column = CornerColumn {
                block_x,
                block_z,
                min_cell_y: self.cell_noise_min_y,
                vertical_cell_blocks: self.cell_height,
            };
            let mut options = SampleOptions::new(
                false,
                self.cell_action(0, 0, 0),
                self.cache_result_id,
                self.cache_fill_id,
                0,
            );
            self.router
                .fill_interpolator_buffers(start, cell_z_index as usize, &column, &mut options);
            self.cache_result_id = options.cache_result_id;
        }
        self.cache_fill_id += 1;
    }

    /// Loads the corners of a cell and fills its per-cell caches.
    pub fn select_cell_yz(&mut self, cell_y_index: i32, cell_z_index: i32) {
        self.router
            .on_sampled_cell_corners(cell_y_index as usize, cell_z_index as usize);
        self.cell_start_block_y = (cell_y_index + self.cell_noise_min_y) * self.cell_height;
        self.cell_start_block_z = (self.first_cell_z + cell_z_index) * self.cell_width;

        self.cache_fill_id += 1;
        let cell = CellBlocks {
            start_x: self.cell_start_block_x,
            start_y: self.cell_start_block_y,
            start_z: self.cell_start_block_z,
            horizontal_cell_blocks: self.cell_width as usize,
            vertical_cell_blocks: self.cell_height as usize,
        };
        let mut options = SampleOptions::new(
            true,
            self.cell_action(0, 0, 0),
            self.cache_result_id,
            self.cache_fill_id,
            0,
        );
        self.router.fill_cell_caches(&cell, &mut options);
        self.cache_fill_id += 1;
    }

    /// Moves to block Y `block_y`, `factor` of the way up the cell.
    pub fn update_for_y(&mut self, block_y: i32, factor: f64) {
        self.in_cell_y = block_y - self.cell_start_block_y;
        self.router.interpolate_y(factor);
    }

    /// Moves to block X `block_x`.
    pub fn update_for_x(&mut self, block_x: i32, factor: f64) {
        self.in_cell_x = block_x - self.cell_start_block_x;
        self.router.interpolate_x(factor);
    }

    /// Moves to block Z `block_z`, completing the block position.
    pub fn update_for_z(&mut self, block_z: i32, factor: f64) {
        self.in_cell_z = block_z - self.cell_start_block_z;
        self.cache_result_id += 1;
        self.router.interpolate_z(factor);
    }

    /// Makes the far corner plane the next near plane.
    pub fn swap_slices(&mut self) {
        self.router.swap_buffers();
    }

    /// Ends interpolation. Later samples evaluate every node directly.
    pub fn stop_interpolation(&mut self) {
        self.interpolating = false;
    }

    /// The block position the cursor is at.
    #[must_use]
    pub const fn current_pos(&self) -> FunctionContext {
        FunctionContext::new(
            self.cell_start_block_x + self.in_cell_x,
            self.cell_start_block_y + self.in_cell_y,
            self.cell_start_block_z + self.in_cell_z,
        )
    }

    /// The block at the cursor: fluid or air from the aquifer where the
    /// terrain is open, an ore vein block, or `None` for the default block.
    pub fn get_interpolated_state(&mut self) -> Option<BlockStateId> {
        let ctx = self.current_pos();
        let options = if self.interpolating {
            SampleOptions::new(
                false,
                self.cell_action(self.in_cell_x, self.in_cell_y, self.in_cell_z),
                self.cache_result_id,
                self.cache_fill_id,
                0,
            )
        } else {
            SampleOptions::skip_cell_caches()
        };

        let density = self.router.sample(self.roots.final_density, &ctx, &options);
        if let Some(state) = self.aquifer.compute_substance(&ctx, density) {
            return Some(state);
        }
        self.ore_veinifier
            .as_ref()
            .and_then(|veins| veins.compute(&mut self.router, self.roots, &ctx, &options))
    }

    /// Final density at the cursor.
    pub fn final_density(&mut self) -> f64 {
        let ctx = self.current_pos();
        let options = SampleOptions::skip_cell_caches();
        self.router.sample(self.roots.final_density, &ctx, &options)
    }

    /// Estimated surface Y of the biome cell holding `(block_x, block_z)`.
    pub fn preliminary_surface_level(&mut self, block_x: i32, block_z: i32) -> i32 {
        let quart_x = biome_to_block(biome_from_block(block_x));
        let quart_z = biome_to_block(biome_from_block(block_z));
        let key = packed_column(quart_x, quart_z);
        if let Some(&level) = self.preliminary_surface_levels.get(&key) {
            return level;
        }
        let ctx = FunctionContext::new(quart_x, 0, quart_z);
        let level = floor(
            self.router
                .sample(self.roots.preliminary_surface_level, &ctx, &SampleOptions::skip_cell_caches()),
        );
        self.preliminary_surface_levels.insert(key, level);
        level
    }

    fn cell_action(&self, x: i32, y: i32, z: i32) -> SampleAction {
        SampleAction::CellCaches(CellOffsets::new(
            x as usize,
            y as usize,
            z as usize,
            self.cell_width as usize,
            self.cell_height as usize,
        ))
    }
}

#[cfg(test)]
mod tests {
    use steel_density::block::blocks;
    use steel_density::density::NoBlending;
    use steel_density::presets;

    use super::*;

    #[test]
    fn test_flat_column_lifecycle() {
        let settings = presets::flat(5).unwrap();
        let state = RandomState::create(&settings, 0).unwrap();
        let mut chunk = NoiseChunk::new(1, &state, 0, 0, &settings.noise, &settings, &NoBlending);
        chunk.initialize_for_first_cell_x();
        chunk.advance_cell_x(0);
        assert!(chunk.is_interpolating());
        assert_eq!(chunk.cell_width(), 4);

        let cell_height = chunk.cell_height();
        for cell_y in (0..settings.noise.cell_count_y()).rev() {
            chunk.select_cell_yz(cell_y, 0);
            for y_in_cell in (0..cell_height).rev() {
                let y = cell_y * cell_height + y_in_cell;
                chunk.update_for_y(y, f64::from(y_in_cell) / f64::from(cell_height));
                chunk.update_for_x(1, 0.25);
                chunk.update_for_z(2, 0.5);
                assert_eq!(chunk.current_pos(), FunctionContext::new(1, y, 2));
                let expected = if y < 5 { None } else { Some(blocks::AIR) };
                assert_eq!(chunk.get_interpolated_state(), expected, "y {y}");
            }
        }
        chunk.stop_interpolation();
        assert!(!chunk.is_interpolating());
        assert!((chunk.final_density() - 4.5).abs() < 1e-9);
    }
}
