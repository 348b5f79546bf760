//! Chunk generation on top of `steel-density`.
//!
//! A [`ProtoChunk`] moves through biomes, surface, carvers and noise. The
//! [`NoiseBasedChunkGenerator`] fills it from a seed-bound noise router,
//! interpolating density over cells with a [`worldgen::NoiseChunk`], and
//! answers column queries without generating a chunk at all.
//!
//! # Key Types
//!
//! - [`ChunkGenerator`] - the per-stage generation trait
//! - [`NoiseBasedChunkGenerator`] - the density router implementation
//! - [`WorldGenerator`] - runs stages in order, async or on the rayon pool
//! - [`WorldGenConfig`] - seed, preset and debug settings

pub mod chunk;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod worldgen;

pub use chunk::{ChunkGenerator, ChunkPos, ChunkStatus, HeightmapType, NoiseBasedChunkGenerator, ProtoChunk};
pub use config::{DebugOverride, Preset, WorldGenConfig, parse_seed};
pub use error::GenerationError;
pub use scheduler::WorldGenerator;
