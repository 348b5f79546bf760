//! Proto chunks and the generators that fill them.

pub mod chunk_generator;
pub mod heightmap;
pub mod noise_generator;
pub mod proto_chunk;
pub mod section;
pub mod status;

pub use chunk_generator::{ChunkGenerator, NoiseColumn, run_stage};
pub use heightmap::{Heightmap, HeightmapType};
pub use noise_generator::NoiseBasedChunkGenerator;
pub use proto_chunk::ProtoChunk;
pub use section::{ChunkSection, SectionLocks};
pub use status::ChunkStatus;

/// Position of a chunk in chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkPos {
    /// Chunk X.
    pub x: i32,
    /// Chunk Z.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a chunk position.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Lowest block X inside the chunk.
    #[must_use]
    pub const fn min_block_x(self) -> i32 {
        self.x << 4
    }

    /// Lowest block Z inside the chunk.
    #[must_use]
    pub const fn min_block_z(self) -> i32 {
        self.z << 4
    }

    /// The chunk containing a block.
    #[must_use]
    pub const fn from_block(block_x: i32, block_z: i32) -> Self {
        Self::new(block_x >> 4, block_z >> 4)
    }
}
