#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use steel_density::random::{Random, RandomSource};
use steel_density::random::legacy_random::LegacyRandom;
use steel_density::random::worldgen_random::WorldgenRandom;

fn bench_legacy_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("legacy_random");

    group.bench_function("next_i32_bounded", |b| {
        let mut random = LegacyRandom::from_seed(black_box(12_345));
        b.iter(|| black_box(random.next_i32_bounded(black_box(100))));
    });

    group.bench_function("next_f64", |b| {
        let mut random = LegacyRandom::from_seed(black_box(12_345));
        b.iter(|| black_box(random.next_f64()));
    });

    group.bench_function("decoration_seed", |b| {
        let mut random = WorldgenRandom::new(RandomSource::new(0, true));
        let mut x = 0;
        b.iter(|| {
            x += 16;
            black_box(random.set_decoration_seed(black_box(12_345), x, -x))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_legacy_random);
criterion_main!(benches);
