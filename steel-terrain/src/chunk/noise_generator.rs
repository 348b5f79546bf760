//! The density-router based chunk generator.

use std::sync::Arc;

use steel_density::block::blocks;
use steel_density::density::NoBlending;
use steel_density::density::chunk::biome_from_block;
use steel_density::math::{floor_div, floor_mod};
use steel_density::{BlockStateId, NoiseGeneratorSettings, NoiseSettings, RandomState};

use crate::chunk::chunk_generator::{ChunkGenerator, NoiseColumn};
use crate::chunk::heightmap::HeightmapType;
use crate::chunk::proto_chunk::ProtoChunk;
use crate::chunk::section::SectionLocks;
use crate::config::DebugOverride;
use crate::error::GenerationError;
use crate::worldgen::biome_source::BiomeSource;
use crate::worldgen::climate::ClimateSampler;
use crate::worldgen::noise_chunk::NoiseChunk;

/// Generates terrain from a seed-bound noise router.
///
/// Cloning shares the settings and the seed state; every chunk builds its own
/// [`NoiseChunk`], so any number of chunks can be generated in parallel.
#[derive(Clone)]
pub struct NoiseBasedChunkGenerator {
    settings: Arc<NoiseGeneratorSettings>,
    random_state: Arc<RandomState>,
    biome_source: Arc<BiomeSource>,
    debug: DebugOverride,
}

impl NoiseBasedChunkGenerator {
    /// Binds `settings` to `seed`.
    ///
    /// # Errors
    /// Fails if the router of `settings` cannot be bound.
    pub fn new(
        settings: NoiseGeneratorSettings,
        seed: u64,
        biome_source: BiomeSource,
    ) -> Result<Self, GenerationError> {
        let random_state = RandomState::create(&settings, seed)?;
        log::info!(
            "Bound noise router for seed {seed} ({} nodes)",
            random_state.router().dag.len()
        );
        Ok(Self::with_random_state(
            Arc::new(settings),
            Arc::new(random_state),
            biome_source,
        ))
    }

    /// A generator over an already bound seed state.
    #[must_use]
    pub fn with_random_state(
        settings: Arc<NoiseGeneratorSettings>,
        random_state: Arc<RandomState>,
        biome_source: BiomeSource,
    ) -> Self {
        Self {
            settings,
            random_state,
            biome_source: Arc::new(biome_source),
            debug: DebugOverride::None,
        }
    }

    /// Replaces placed blocks for debugging. Column queries are unaffected.
    #[must_use]
    pub fn with_debug_override(mut self, debug: DebugOverride) -> Self {
        self.debug = debug;
        self
    }

    /// The generator settings.
    #[must_use]
    pub fn settings(&self) -> &NoiseGeneratorSettings {
        &self.settings
    }

    /// The seed state.
    #[must_use]
    pub fn random_state(&self) -> &RandomState {
        &self.random_state
    }

    /// The noise settings clipped to `min_y..min_y + height`, or `None` if
    /// the two ranges don't overlap.
    fn clamped_noise(&self, min_y: i32, height: i32) -> Result<Option<NoiseSettings>, GenerationError> {
        let noise = &self.settings.noise;
        let clamped_min = noise.min_y.max(min_y);
        let clamped_max = (noise.min_y + noise.height).min(min_y + height);
        if clamped_max <= clamped_min {
            return Ok(None);
        }
        Ok(Some(noise.clamp_to_height(min_y, height)?))
    }

    /// Walks one column top down, storing every state into `column` if given
    /// and stopping at the first state matching `stop_at`.
    ///
    /// Returns the Y above the matching block.
    fn iterate_noise_column(
        &self,
        block_x: i32,
        block_z: i32,
        mut column: Option<&mut [BlockStateId]>,
        stop_at: Option<HeightmapType>,
    ) -> Option<i32> {
        let noise = &self.settings.noise;
        let cell_width = noise.cell_width();
        let cell_height = noise.cell_height();
        let cell_min_y = noise.min_cell_y();
        let cell_count_y = noise.cell_count_y();
        if cell_count_y <= 0 {
            return None;
        }

        let first_block_x = floor_div(block_x, cell_width) * cell_width;
        let first_block_z = floor_div(block_z, cell_width) * cell_width;
        let factor_x = f64::from(floor_mod(block_x, cell_width)) / f64::from(cell_width);
        let factor_z = f64::from(floor_mod(block_z, cell_width)) / f64::from(cell_width);

        let mut chunk = NoiseChunk::new(
            1,
            &self.random_state,
            first_block_x,
            first_block_z,
            noise,
            &self.settings,
            &NoBlending,
        );
        chunk.initialize_for_first_cell_x();
        chunk.advance_cell_x(0);

        for cell_y in (0..cell_count_y).rev() {
            chunk.select_cell_yz(cell_y, 0);
            for y_in_cell in (0..cell_height).rev() {
                let block_y = (cell_min_y + cell_y) * cell_height + y_in_cell;
                chunk.update_for_y(block_y, f64::from(y_in_cell) / f64::from(cell_height));
                chunk.update_for_x(block_x, factor_x);
                chunk.update_for_z(block_z, factor_z);

                let state = chunk
                    .get_interpolated_state()
                    .unwrap_or(self.settings.default_block);
                if let Some(column) = column.as_deref_mut() {
                    column[(cell_y * cell_height + y_in_cell) as usize] = state;
                }
                if stop_at.is_some_and(|kind| kind.is_opaque(state)) {
                    chunk.stop_interpolation();
                    return Some(block_y + 1);
                }
            }
        }
        chunk.stop_interpolation();
        None
    }

    /// Places every block of `chunk` between the clamped cell rows.
    fn do_fill(
        &self,
        chunk: &ProtoChunk,
        locks: &mut SectionLocks,
        noise: &NoiseSettings,
    ) {
        let pos = chunk.pos();
        let cell_width = noise.cell_width();
        let cell_height = noise.cell_height();
        let cell_count_xz = 16 / cell_width;
        let cell_min_y = noise.min_cell_y();
        let cell_count_y = noise.cell_count_y();
        let min_block_x = pos.min_block_x();
        let min_block_z = pos.min_block_z();

        let mut noise_chunk = NoiseChunk::new(
            cell_count_xz,
            &self.random_state,
            min_block_x,
            min_block_z,
            noise,
            &self.settings,
            &NoBlending,
        );
        let mut heightmaps = chunk.heightmaps();
        let mut light_sources = Vec::new();
        let mut fluids = Vec::new();

        noise_chunk.initialize_for_first_cell_x();
        for cell_x in 0..cell_count_xz {
            noise_chunk.advance_cell_x(cell_x);
            for cell_z in 0..cell_count_xz {
                for cell_y in (0..cell_count_y).rev() {
                    noise_chunk.select_cell_yz(cell_y, cell_z);
                    for y_in_cell in (0..cell_height).rev() {
                        let block_y = (cell_min_y + cell_y) * cell_height + y_in_cell;
                        let Some(section) = locks.section_mut(block_y >> 4) else {
                            continue;
                        };
                        noise_chunk.update_for_y(block_y, f64::from(y_in_cell) / f64::from(cell_height));

                        for x_in_cell in 0..cell_width {
                            let block_x = min_block_x + cell_x * cell_width + x_in_cell;
                            let local_x = (block_x & 15) as usize;
                            noise_chunk.update_for_x(block_x, f64::from(x_in_cell) / f64::from(cell_width));

                            for z_in_cell in 0..cell_width {
                                let block_z = min_block_z + cell_z * cell_width + z_in_cell;
                                let local_z = (block_z & 15) as usize;
                                noise_chunk.update_for_z(block_z, f64::from(z_in_cell) / f64::from(cell_width));

                                let state = match self.debug {
                                    DebugOverride::PreliminarySurface => {
                                        if block_y < noise_chunk.preliminary_surface_level(block_x, block_z) {
                                            self.settings.default_block
                                        } else {
                                            blocks::AIR
                                        }
                                    }
                                    _ => noise_chunk
                                        .get_interpolated_state()
                                        .unwrap_or(self.settings.default_block),
                                };
                                if state.is_air() {
                                    continue;
                                }

                                section.set_block_state(local_x, (block_y & 15) as usize, local_z, state);
                                heightmaps.update(local_x, block_y, local_z, state);
                                if state.light_emission() > 0 {
                                    light_sources.push(chunk.world_pos(local_x, block_y, local_z));
                                }
                                if state.fluid().is_some() {
                                    fluids.push(chunk.world_pos(local_x, block_y, local_z));
                                }
                            }
                        }
                    }
                }
            }
            noise_chunk.swap_slices();
        }
        noise_chunk.stop_interpolation();
        drop(heightmaps);

        chunk.add_light_sources(light_sources);
        chunk.mark_for_postprocessing(fluids);
    }
}

impl ChunkGenerator for NoiseBasedChunkGenerator {
    #[tracing::instrument(level = "trace", skip_all, fields(pos = ?chunk.pos()))]
    fn create_biomes(&self, chunk: &ProtoChunk) -> Result<(), GenerationError> {
        let pos = chunk.pos();
        let mut sampler = ClimateSampler::for_chunk(self.random_state.router(), pos, &self.settings.noise);
        let min_section_y = chunk.min_section_y();
        let mut locks = SectionLocks::acquire(chunk.sections(), min_section_y);
        let quart_x = biome_from_block(pos.min_block_x());
        let quart_z = biome_from_block(pos.min_block_z());
        let mut last = None;

        for x in 0..4 {
            for z in 0..4 {
                for section_y in min_section_y..min_section_y + locks.len() as i32 {
                    let Some(section) = locks.section_mut(section_y) else {
                        continue;
                    };
                    for y in 0..4 {
                        let biome = self.biome_source.get_noise_biome(
                            quart_x + x as i32,
                            (section_y << 2) + y as i32,
                            quart_z + z as i32,
                            &mut sampler,
                            &mut last,
                        );
                        section.set_biome(x, y, z, biome);
                    }
                }
            }
        }
        Ok(())
    }

    fn build_surface(&self, chunk: &ProtoChunk) -> Result<(), GenerationError> {
        log::trace!("No surface rules for chunk {:?}", chunk.pos());
        Ok(())
    }

    fn apply_carvers(&self, chunk: &ProtoChunk) -> Result<(), GenerationError> {
        log::trace!("No carvers for chunk {:?}", chunk.pos());
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all, fields(pos = ?chunk.pos()))]
    fn fill_from_noise(&self, chunk: &ProtoChunk) -> Result<(), GenerationError> {
        let Some(noise) = self.clamped_noise(chunk.min_y(), chunk.height())? else {
            return Ok(());
        };
        let cell_count_y = noise.cell_count_y();
        if cell_count_y <= 0 || self.debug == DebugOverride::VoidTerrain {
            return Ok(());
        }

        let min_y = noise.min_y;
        let max_y = min_y + cell_count_y * noise.cell_height() - 1;
        let (Some(min_index), Some(max_index)) = (chunk.section_index(min_y), chunk.section_index(max_y)) else {
            return Ok(());
        };
        let mut locks = SectionLocks::acquire(&chunk.sections()[min_index..=max_index], min_y >> 4);
        self.do_fill(chunk, &mut locks, &noise);
        Ok(())
    }

    fn base_height(&self, block_x: i32, block_z: i32, kind: HeightmapType) -> Option<i32> {
        self.iterate_noise_column(block_x, block_z, None, Some(kind))
    }

    fn base_column(&self, block_x: i32, block_z: i32) -> NoiseColumn {
        let noise = &self.settings.noise;
        let cell_count_y = noise.cell_count_y().max(0);
        let mut states = vec![BlockStateId::default(); (cell_count_y * noise.cell_height()) as usize];
        self.iterate_noise_column(block_x, block_z, Some(&mut states), None);
        NoiseColumn::new(noise.min_cell_y() * noise.cell_height(), states.into_boxed_slice())
    }

    fn min_y(&self) -> i32 {
        self.settings.noise.min_y
    }

    fn gen_depth(&self) -> i32 {
        self.settings.noise.height
    }

    fn sea_level(&self) -> i32 {
        self.settings.sea_level
    }
}
