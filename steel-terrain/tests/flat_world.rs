//! Flat presets place exactly their layer count in every column.

use steel_density::block::blocks;
use steel_density::presets;
use steel_terrain::chunk::ChunkGenerator;
use steel_terrain::worldgen::BiomeSource;
use steel_terrain::worldgen::biome_source::biomes;
use steel_terrain::{ChunkPos, HeightmapType, NoiseBasedChunkGenerator, WorldGenerator};
use std::sync::Arc;

fn flat(layers: u32) -> NoiseBasedChunkGenerator {
    NoiseBasedChunkGenerator::new(presets::flat(layers).unwrap(), 1234, BiomeSource::Fixed(biomes::PLAINS))
        .unwrap()
}

#[test]
fn heightmaps_match_layer_count() {
    for layers in [1, 5, 16, 37] {
        let world = WorldGenerator::new(Arc::new(flat(layers)));
        let chunk = world.generate_blocking(ChunkPos::new(0, 0)).unwrap();
        let expected = i32::try_from(layers).unwrap();
        for x in 0..16 {
            for z in 0..16 {
                for kind in HeightmapType::ALL {
                    assert_eq!(chunk.height_at(kind, x, z), expected, "{kind:?} at {x} {z}");
                }
            }
        }
    }
}

#[test]
fn base_height_matches_everywhere() {
    let generator = flat(37);
    for (x, z) in [(0, 0), (5, 11), (-1, -1), (-300, 77), (12_345, -9_876)] {
        for kind in HeightmapType::ALL {
            assert_eq!(generator.base_height(x, z, kind), Some(37));
        }
    }
}

#[test]
fn empty_flat_world_has_no_surface() {
    let generator = flat(0);
    assert_eq!(generator.base_height(3, 4, HeightmapType::WorldSurfaceWg), None);
    let chunk = WorldGenerator::new(Arc::new(generator))
        .generate_blocking(ChunkPos::new(2, -2))
        .unwrap();
    assert!(chunk.sections().iter().all(|section| section.lock().has_only_air()));
}

#[test]
fn base_column_matches_generated_chunk() {
    let generator = Arc::new(flat(20));
    let column = generator.base_column(-13, 40);
    let chunk = WorldGenerator::new(generator.clone())
        .generate_blocking(ChunkPos::from_block(-13, 40))
        .unwrap();
    for y in 0..generator.gen_depth() {
        assert_eq!(column.get_block(y), chunk.get_block_state(3, y, 8), "y {y}");
    }
    assert_eq!(column.get_block(19), blocks::STONE);
    assert_eq!(column.get_block(20), blocks::AIR);
}
