#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use steel_density::presets;
use steel_terrain::chunk::ChunkGenerator;
use steel_terrain::worldgen::{BiomeSource, MultiNoiseBiomeSource};
use steel_terrain::{ChunkPos, HeightmapType, NoiseBasedChunkGenerator, WorldGenerator};
use std::sync::Arc;

fn overworld() -> NoiseBasedChunkGenerator {
    NoiseBasedChunkGenerator::new(
        presets::overworld().unwrap(),
        0,
        BiomeSource::MultiNoise(MultiNoiseBiomeSource::overworld()),
    )
    .unwrap()
}

fn bench_single_chunk(c: &mut Criterion) {
    let world = WorldGenerator::new(Arc::new(overworld()));

    c.bench_function("overworld_chunk_fill", |b| {
        b.iter(|| black_box(world.generate_blocking(black_box(ChunkPos::new(0, 0))).unwrap()));
    });
}

fn bench_chunk_grid(c: &mut Criterion) {
    let world = WorldGenerator::new(Arc::new(overworld()));

    let mut group = c.benchmark_group("overworld_chunk_grid");
    for radius in [1, 2] {
        let side = radius * 2 + 1;
        let positions: Vec<_> = (-radius..=radius)
            .flat_map(|x| (-radius..=radius).map(move |z| ChunkPos::new(x, z)))
            .collect();
        group.throughput(criterion::Throughput::Elements(positions.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{side}x{side}")),
            &positions,
            |b, positions| b.iter(|| black_box(world.generate_batch(positions))),
        );
    }
    group.finish();
}

fn bench_base_height(c: &mut Criterion) {
    let generator = overworld();

    c.bench_function("overworld_base_height", |b| {
        let mut x = 0;
        b.iter(|| {
            x += 17;
            black_box(generator.base_height(black_box(x), 0, HeightmapType::OceanFloorWg))
        });
    });
}

criterion_group!(benches, bench_single_chunk, bench_chunk_grid, bench_base_height);
criterion_main!(benches);
