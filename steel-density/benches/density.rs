#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use steel_density::density::FunctionContext;
use steel_density::{RandomState, presets};

fn bench_seed_binding(c: &mut Criterion) {
    let settings = presets::overworld().expect("overworld preset");
    c.bench_function("bind_overworld", |b| {
        b.iter(|| RandomState::create(&settings, black_box(42)).expect("binding"));
    });
}

fn bench_root_evaluation(c: &mut Criterion) {
    let settings = presets::overworld().expect("overworld preset");
    let state = RandomState::create(&settings, 42).expect("binding");
    let router = state.router();

    let mut group = c.benchmark_group("evaluate");
    for (name, root) in [
        ("continents", router.continents),
        ("depth", router.depth),
        ("final_density", router.final_density),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &root, |b, &root| {
            let mut x = 0;
            b.iter(|| {
                x += 3;
                black_box(router.dag.evaluate(root, &FunctionContext::new(x, 40, -x)))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_seed_binding, bench_root_evaluation);
criterion_main!(benches);
