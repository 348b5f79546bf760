use steel_density::BlockStateId;

use crate::chunk::heightmap::HeightmapType;
use crate::chunk::proto_chunk::ProtoChunk;
use crate::chunk::status::ChunkStatus;
use crate::error::GenerationError;

/// Blocks of one column as the noise stage would place them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseColumn {
    min_y: i32,
    states: Box<[BlockStateId]>,
}

impl NoiseColumn {
    /// A column starting at `min_y`.
    #[must_use]
    pub const fn new(min_y: i32, states: Box<[BlockStateId]>) -> Self {
        Self { min_y, states }
    }

    /// State at `y`, air outside the column.
    #[must_use]
    pub fn get_block(&self, y: i32) -> BlockStateId {
        usize::try_from(y - self.min_y)
            .ok()
            .and_then(|index| self.states.get(index))
            .copied()
            .unwrap_or_default()
    }

    /// Lowest Y.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// States bottom to top.
    #[must_use]
    pub fn states(&self) -> &[BlockStateId] {
        &self.states
    }
}

/// Generates the terrain of proto chunks, one stage at a time.
///
/// Matches the stage methods of vanilla's `ChunkGenerator`. Stage methods
/// don't check ordering themselves; [`run_stage`] does.
pub trait ChunkGenerator: Send + Sync {
    /// Assigns biomes to every biome cell.
    fn create_biomes(&self, chunk: &ProtoChunk) -> Result<(), GenerationError>;

    /// Applies surface rules.
    fn build_surface(&self, chunk: &ProtoChunk) -> Result<(), GenerationError>;

    /// Applies carvers.
    fn apply_carvers(&self, chunk: &ProtoChunk) -> Result<(), GenerationError>;

    /// Fills terrain from the density router.
    fn fill_from_noise(&self, chunk: &ProtoChunk) -> Result<(), GenerationError>;

    /// Y above the highest block of column `(block_x, block_z)` matching `kind`,
    /// without generating a chunk. `None` if no block matches.
    fn base_height(&self, block_x: i32, block_z: i32, kind: HeightmapType) -> Option<i32>;

    /// Every block of column `(block_x, block_z)`, without generating a chunk.
    fn base_column(&self, block_x: i32, block_z: i32) -> NoiseColumn;

    /// Lowest generated Y.
    fn min_y(&self) -> i32;

    /// Number of generated layers.
    fn gen_depth(&self) -> i32;

    /// Sea level.
    fn sea_level(&self) -> i32;
}

/// Runs one stage on `chunk` after checking that its predecessor completed.
pub fn run_stage(
    generator: &dyn ChunkGenerator,
    chunk: &ProtoChunk,
    stage: ChunkStatus,
) -> Result<(), GenerationError> {
    chunk.check_stage(stage)?;
    match stage {
        ChunkStatus::Empty => {}
        ChunkStatus::Biomes => generator.create_biomes(chunk)?,
        ChunkStatus::Surface => generator.build_surface(chunk)?,
        ChunkStatus::Carvers => generator.apply_carvers(chunk)?,
        ChunkStatus::Noise => generator.fill_from_noise(chunk)?,
    }
    chunk.complete_stage(stage)?;
    log::debug!("Chunk {:?} reached {}", chunk.pos(), stage.name());
    Ok(())
}
