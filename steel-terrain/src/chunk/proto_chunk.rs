use std::sync::Arc;

use glam::IVec3;
use parking_lot::{Mutex, MutexGuard};
use steel_density::BlockStateId;

use crate::chunk::heightmap::{Heightmap, HeightmapType};
use crate::chunk::section::ChunkSection;
use crate::chunk::status::ChunkStatus;
use crate::chunk::ChunkPos;
use crate::error::GenerationError;

/// The two generation heightmaps of a chunk.
pub struct Heightmaps {
    /// Highest non-air block.
    pub world_surface: Heightmap,
    /// Highest motion-blocking block.
    pub ocean_floor: Heightmap,
}

impl Heightmaps {
    fn new(min_y: i32) -> Self {
        Self {
            world_surface: Heightmap::new(HeightmapType::WorldSurfaceWg, min_y),
            ocean_floor: Heightmap::new(HeightmapType::OceanFloorWg, min_y),
        }
    }

    /// The heightmap of `kind`.
    #[must_use]
    pub const fn get(&self, kind: HeightmapType) -> &Heightmap {
        match kind {
            HeightmapType::WorldSurfaceWg => &self.world_surface,
            HeightmapType::OceanFloorWg => &self.ocean_floor,
        }
    }

    /// Records a placed state in both heightmaps.
    pub fn update(&mut self, x: usize, y: i32, z: usize, state: BlockStateId) {
        self.world_surface.update(x, y, z, state);
        self.ocean_floor.update(x, y, z, state);
    }
}

/// A chunk under generation.
///
/// Sections sit behind their own mutex so that the fill stage can lock
/// exactly the range it writes while other readers keep working on the rest.
/// All other state is behind short-lived locks.
pub struct ProtoChunk {
    pos: ChunkPos,
    min_y: i32,
    height: i32,
    sections: Box<[Arc<Mutex<ChunkSection>>]>,
    heightmaps: Mutex<Heightmaps>,
    light_sources: Mutex<Vec<IVec3>>,
    postprocessing: Mutex<Vec<IVec3>>,
    status: Mutex<ChunkStatus>,
}

impl ProtoChunk {
    /// An empty chunk covering `min_y..min_y + height`. Both must be multiples of 16.
    #[must_use]
    pub fn new(pos: ChunkPos, min_y: i32, height: i32) -> Self {
        let section_count = (height >> 4).max(0) as usize;
        Self {
            pos,
            min_y,
            height,
            sections: (0..section_count)
                .map(|_| Arc::new(Mutex::new(ChunkSection::new_empty())))
                .collect(),
            heightmaps: Mutex::new(Heightmaps::new(min_y)),
            light_sources: Mutex::new(Vec::new()),
            postprocessing: Mutex::new(Vec::new()),
            status: Mutex::new(ChunkStatus::Empty),
        }
    }

    /// Chunk position.
    #[must_use]
    pub const fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// Lowest block Y.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Number of block layers.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Section Y of the lowest section.
    #[must_use]
    pub const fn min_section_y(&self) -> i32 {
        self.min_y >> 4
    }

    /// The sections, bottom to top.
    #[must_use]
    pub fn sections(&self) -> &[Arc<Mutex<ChunkSection>>] {
        &self.sections
    }

    /// Index into [`Self::sections`] of the section holding block Y `y`.
    #[must_use]
    pub fn section_index(&self, y: i32) -> Option<usize> {
        usize::try_from((y >> 4) - self.min_section_y())
            .ok()
            .filter(|&index| index < self.sections.len())
    }

    /// Block state at chunk-local `x`, `z` and world `y`; air outside the chunk.
    #[must_use]
    pub fn get_block_state(&self, x: usize, y: i32, z: usize) -> BlockStateId {
        self.section_index(y).map_or_else(BlockStateId::default, |index| {
            self.sections[index].lock().get_block_state(x & 15, (y & 15) as usize, z & 15)
        })
    }

    /// Places a state outside the noise stage, keeping heightmaps and light sources current.
    pub fn set_block_state(&self, x: usize, y: i32, z: usize, state: BlockStateId) {
        let Some(index) = self.section_index(y) else {
            return;
        };
        self.sections[index]
            .lock()
            .set_block_state(x & 15, (y & 15) as usize, z & 15, state);
        self.heightmaps.lock().update(x & 15, y, z & 15, state);
        if state.light_emission() > 0 {
            self.light_sources.lock().push(self.world_pos(x, y, z));
        }
    }

    /// Biome at chunk-local quart `x`, `z` and world quart `y`.
    #[must_use]
    pub fn get_biome(&self, quart_x: usize, quart_y: i32, quart_z: usize) -> u16 {
        let section_y = quart_y >> 2;
        usize::try_from(section_y - self.min_section_y())
            .ok()
            .and_then(|index| self.sections.get(index))
            .map_or(0, |section| {
                section.lock().get_biome(quart_x & 3, (quart_y & 3) as usize, quart_z & 3)
            })
    }

    /// World position of chunk-local `x`, `z` at world `y`.
    #[must_use]
    pub const fn world_pos(&self, x: usize, y: i32, z: usize) -> IVec3 {
        IVec3::new(self.pos.min_block_x() + x as i32, y, self.pos.min_block_z() + z as i32)
    }

    /// Locks the heightmaps.
    pub fn heightmaps(&self) -> MutexGuard<'_, Heightmaps> {
        self.heightmaps.lock()
    }

    /// First free Y above the surface of `kind` in column `(x, z)`.
    #[must_use]
    pub fn height_at(&self, kind: HeightmapType, x: usize, z: usize) -> i32 {
        self.heightmaps.lock().get(kind).first_available(x & 15, z & 15)
    }

    /// Positions of placed light-emitting blocks.
    #[must_use]
    pub fn light_sources(&self) -> Vec<IVec3> {
        self.light_sources.lock().clone()
    }

    /// Positions of placed fluids awaiting a fluid tick.
    #[must_use]
    pub fn postprocessing(&self) -> Vec<IVec3> {
        self.postprocessing.lock().clone()
    }

    pub(crate) fn add_light_sources(&self, positions: Vec<IVec3>) {
        if !positions.is_empty() {
            self.light_sources.lock().extend(positions);
        }
    }

    pub(crate) fn mark_for_postprocessing(&self, positions: Vec<IVec3>) {
        if !positions.is_empty() {
            self.postprocessing.lock().extend(positions);
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ChunkStatus {
        *self.status.lock()
    }

    /// Checks that `stage` is the next stage for this chunk.
    pub fn check_stage(&self, stage: ChunkStatus) -> Result<(), GenerationError> {
        let current = self.status();
        if stage.parent() == Some(current) {
            Ok(())
        } else {
            Err(GenerationError::StageOrder {
                pos: self.pos,
                current,
                requested: stage,
            })
        }
    }

    /// Marks `stage` as completed.
    pub fn complete_stage(&self, stage: ChunkStatus) -> Result<(), GenerationError> {
        let mut status = self.status.lock();
        if stage.parent() != Some(*status) {
            return Err(GenerationError::StageOrder {
                pos: self.pos,
                current: *status,
                requested: stage,
            });
        }
        *status = stage;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use steel_density::block::blocks;

    use super::*;

    #[test]
    fn test_section_index() {
        let chunk = ProtoChunk::new(ChunkPos::new(0, 0), -64, 384);
        assert_eq!(chunk.sections().len(), 24);
        assert_eq!(chunk.section_index(-64), Some(0));
        assert_eq!(chunk.section_index(-49), Some(0));
        assert_eq!(chunk.section_index(-48), Some(1));
        assert_eq!(chunk.section_index(319), Some(23));
        assert_eq!(chunk.section_index(320), None);
        assert_eq!(chunk.section_index(-65), None);
    }

    #[test]
    fn test_set_block_tracks_surface_and_light() {
        let chunk = ProtoChunk::new(ChunkPos::new(-1, 2), 0, 64);
        chunk.set_block_state(5, 12, 7, blocks::LAVA);
        assert_eq!(chunk.get_block_state(5, 12, 7), blocks::LAVA);
        assert_eq!(chunk.height_at(HeightmapType::WorldSurfaceWg, 5, 7), 13);
        assert_eq!(chunk.height_at(HeightmapType::OceanFloorWg, 5, 7), 0);
        assert_eq!(chunk.light_sources(), vec![IVec3::new(-11, 12, 39)]);
        assert_eq!(chunk.get_block_state(5, 80, 7), blocks::AIR);
    }

    #[test]
    fn test_stage_order() {
        let chunk = ProtoChunk::new(ChunkPos::new(0, 0), 0, 16);
        assert!(chunk.check_stage(ChunkStatus::Surface).is_err());
        assert!(chunk.complete_stage(ChunkStatus::Biomes).is_ok());
        assert!(matches!(
            chunk.complete_stage(ChunkStatus::Biomes),
            Err(GenerationError::StageOrder {
                current: ChunkStatus::Biomes,
                requested: ChunkStatus::Biomes,
                ..
            })
        ));
        assert_eq!(chunk.status(), ChunkStatus::Biomes);
    }
}
