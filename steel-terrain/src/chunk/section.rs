//! 16×16×16 block sections and the locks taken on them during fill.

use std::mem;
use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use steel_density::BlockStateId;

/// Blocks along each axis of a section.
pub const SECTION_WIDTH: usize = 16;
/// Blocks in a section.
pub const BLOCKS_PER_SECTION: usize = SECTION_WIDTH * SECTION_WIDTH * SECTION_WIDTH;
/// Biome cells in a section, one per 4×4×4 blocks.
pub const BIOMES_PER_SECTION: usize = 64;

/// One vertical section of a chunk.
pub struct ChunkSection {
    states: Box<[BlockStateId]>,
    biomes: [u16; BIOMES_PER_SECTION],
    non_air_count: u16,
}

impl ChunkSection {
    /// An all-air section with biome 0.
    #[must_use]
    pub fn new_empty() -> Self {
        Self {
            states: vec![BlockStateId::default(); BLOCKS_PER_SECTION].into_boxed_slice(),
            biomes: [0; BIOMES_PER_SECTION],
            non_air_count: 0,
        }
    }

    #[inline]
    const fn block_index(x: usize, y: usize, z: usize) -> usize {
        (y << 8) | (z << 4) | x
    }

    #[inline]
    const fn biome_index(x: usize, y: usize, z: usize) -> usize {
        (y << 4) | (z << 2) | x
    }

    /// State at section-local coordinates.
    #[must_use]
    pub fn get_block_state(&self, x: usize, y: usize, z: usize) -> BlockStateId {
        self.states[Self::block_index(x, y, z)]
    }

    /// Replaces the state at section-local coordinates, returning the old one.
    pub fn set_block_state(&mut self, x: usize, y: usize, z: usize, state: BlockStateId) -> BlockStateId {
        let slot = &mut self.states[Self::block_index(x, y, z)];
        let old = mem::replace(slot, state);
        if old.is_air() && !state.is_air() {
            self.non_air_count += 1;
        } else if !old.is_air() && state.is_air() {
            self.non_air_count -= 1;
        }
        old
    }

    /// Biome at section-local quart coordinates.
    #[must_use]
    pub const fn get_biome(&self, x: usize, y: usize, z: usize) -> u16 {
        self.biomes[Self::biome_index(x, y, z)]
    }

    /// Sets the biome at section-local quart coordinates.
    pub const fn set_biome(&mut self, x: usize, y: usize, z: usize, biome: u16) {
        self.biomes[Self::biome_index(x, y, z)] = biome;
    }

    /// Whether every block is air.
    #[must_use]
    pub const fn has_only_air(&self) -> bool {
        self.non_air_count == 0
    }

    /// Number of non-air blocks.
    #[must_use]
    pub const fn non_air_count(&self) -> u16 {
        self.non_air_count
    }
}

/// Exclusive access to a run of consecutive sections.
///
/// The guards are released when this value drops, whether the holder
/// finished, returned an error or unwound.
pub struct SectionLocks {
    guards: Vec<ArcMutexGuard<RawMutex, ChunkSection>>,
    min_section_y: i32,
}

impl SectionLocks {
    /// Locks every section of `sections`, bottom to top. The first one sits at
    /// section Y `min_section_y`.
    #[must_use]
    pub fn acquire(sections: &[Arc<Mutex<ChunkSection>>], min_section_y: i32) -> Self {
        Self {
            guards: sections.iter().map(|section| section.lock_arc()).collect(),
            min_section_y,
        }
    }

    /// The locked section at section Y `section_y`.
    pub fn section_mut(&mut self, section_y: i32) -> Option<&mut ChunkSection> {
        let index = usize::try_from(section_y - self.min_section_y).ok()?;
        self.guards.get_mut(index).map(|guard| &mut **guard)
    }

    /// Number of locked sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Whether nothing is locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}
