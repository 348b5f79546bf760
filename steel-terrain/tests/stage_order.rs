//! Stages run in order, once each, and release their locks.

use std::sync::Arc;

use steel_density::presets;
use steel_terrain::chunk::{ChunkGenerator, run_stage};
use steel_terrain::worldgen::BiomeSource;
use steel_terrain::worldgen::biome_source::biomes;
use steel_terrain::{ChunkPos, ChunkStatus, GenerationError, NoiseBasedChunkGenerator, WorldGenerator};

fn flat_world(layers: u32) -> WorldGenerator {
    let generator =
        NoiseBasedChunkGenerator::new(presets::flat(layers).unwrap(), 9, BiomeSource::Fixed(biomes::FOREST)).unwrap();
    WorldGenerator::new(Arc::new(generator))
}

#[test]
fn fill_before_biomes_is_rejected() {
    let world = flat_world(4);
    let chunk = world.new_chunk(ChunkPos::new(0, 0));
    let err = run_stage(world.generator(), &chunk, ChunkStatus::Noise).unwrap_err();
    assert!(matches!(
        err,
        GenerationError::StageOrder {
            current: ChunkStatus::Empty,
            requested: ChunkStatus::Noise,
            ..
        }
    ));
    assert_eq!(chunk.status(), ChunkStatus::Empty);
    assert!(chunk.sections().iter().all(|section| section.lock().has_only_air()));
}

#[test]
fn stages_cannot_repeat() {
    let world = flat_world(4);
    let chunk = world.new_chunk(ChunkPos::new(0, 0));
    for stage in ChunkStatus::STAGES {
        run_stage(world.generator(), &chunk, stage).unwrap();
    }
    assert_eq!(chunk.status(), ChunkStatus::Noise);
    assert!(run_stage(world.generator(), &chunk, ChunkStatus::Noise).is_err());
    assert!(run_stage(world.generator(), &chunk, ChunkStatus::Biomes).is_err());
}

#[test]
fn section_locks_are_released_after_fill() {
    let world = flat_world(30);
    let chunk = world.generate_blocking(ChunkPos::new(4, -4)).unwrap();
    for section in chunk.sections() {
        assert!(section.try_lock().is_some());
    }
    assert_eq!(chunk.get_biome(0, 0, 0), biomes::FOREST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_generation_matches_blocking() {
    let world = flat_world(12);
    let positions = [ChunkPos::new(0, 0), ChunkPos::new(-1, 3), ChunkPos::new(8, 8)];
    let results = world.generate_many(&positions).await;
    assert_eq!(results.len(), positions.len());
    for (pos, result) in positions.iter().zip(results) {
        let chunk = result.unwrap();
        assert_eq!(chunk.pos(), *pos);
        assert_eq!(chunk.status(), ChunkStatus::Noise);
        let blocking = world.generate_blocking(*pos).unwrap();
        for y in world.generator().min_y()..world.generator().min_y() + world.generator().gen_depth() {
            assert_eq!(chunk.get_block_state(6, y, 2), blocking.get_block_state(6, y, 2));
        }
    }
}
