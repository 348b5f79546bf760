#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use steel_density::random::xoroshiro::Xoroshiro;
use steel_density::random::{PositionalRandom, Random};

fn bench_xoroshiro(c: &mut Criterion) {
    let mut group = c.benchmark_group("xoroshiro");

    group.bench_function("next_i64", |b| {
        let mut random = Xoroshiro::from_seed(black_box(12_345));
        b.iter(|| black_box(random.next_i64()));
    });

    group.bench_function("next_f64", |b| {
        let mut random = Xoroshiro::from_seed(black_box(12_345));
        b.iter(|| black_box(random.next_f64()));
    });

    group.bench_function("positional_at", |b| {
        let splitter = Xoroshiro::from_seed(black_box(12_345)).next_positional();
        let mut x = 0;
        b.iter(|| {
            x += 1;
            black_box(splitter.at(x, 64, -x).next_i64())
        });
    });

    group.bench_function("with_hash_of", |b| {
        let splitter = Xoroshiro::from_seed(black_box(12_345)).next_positional();
        b.iter(|| black_box(splitter.with_hash_of(black_box("minecraft:continentalness"))));
    });

    group.finish();
}

criterion_group!(benches, bench_xoroshiro);
criterion_main!(benches);
