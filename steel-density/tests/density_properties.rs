//! Properties every density DAG must satisfy, checked against a seed-bound DAG
//! that contains each node kind.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use steel_density::block::blocks;
use steel_density::density::chunk::{CellOffsets, ChunkBuildOptions, ChunkRouter, CornerColumn};
use steel_density::density::{
    ContextProvider, CubicSpline, DensityDag, DensityFunction, DensityStack, FunctionContext, NoBlending,
    RarityValueMapper, SampleAction, SampleOptions, SplinePoint,
};
use steel_density::noise::{BlendedNoiseParameters, NoiseParameters};
use steel_density::random::Random;
use steel_density::random::xoroshiro::Xoroshiro;
use steel_density::{NoiseGeneratorSettings, NoiseRouter, NoiseSettings, RandomState};

const A: &str = "test:a";
const B: &str = "test:b";

/// Builds a router whose roots reach at least one node of every kind.
fn every_node_settings() -> NoiseGeneratorSettings {
    let mut dag = DensityDag::new();
    let zero = dag.constant(0.0);
    let gradient = dag.y_clamped_gradient(-64, 320, 1.0, -1.0);
    let noise = dag.noise(A, 0.5, 0.25);
    let shift_a = dag.shift_a(B);
    let shift_b = dag.shift_b(B);
    let shift = dag.shift(B);
    let shifted = dag.shifted_noise(A, [shift_a, shift, shift_b], 0.25, 0.0);
    let blended = dag.blended_noise(BlendedNoiseParameters {
        xz_scale: 0.25,
        y_scale: 0.125,
        xz_factor: 80.0,
        y_factor: 160.0,
        smear_scale_multiplier: 8.0,
    });
    let weird = dag.weird_scaled(noise, B, RarityValueMapper::Caves);
    let islands = dag.end_islands();
    let plus = dag.add(noise, shifted);
    let times = dag.mul(gradient, weird);
    let low = dag.min(blended, islands);
    let high = dag.max(plus, times);
    let abs = dag.abs(noise);
    let square = dag.square(shifted);
    let cube = dag.cube(noise);
    let half = dag.half_negative(noise);
    let quarter = dag.quarter_negative(shifted);
    let squeeze = dag.squeeze(plus);
    let clamp = dag.clamp(plus, -0.5, 0.75);
    let choice = dag.range_choice(noise, -0.2, 0.3, square, cube);
    let nested = CubicSpline::new(
        gradient,
        vec![SplinePoint::constant(-1.0, 2.0, 0.0), SplinePoint::constant(1.0, -1.0, 0.0)],
    );
    let spline = dag.spline(CubicSpline::new(
        noise,
        vec![
            SplinePoint::constant(-0.5, -1.0, 0.0),
            SplinePoint::nested(0.0, nested, 0.0),
            SplinePoint::constant(0.5, 0.5, 0.0),
        ],
    ));
    let alpha = dag.blend_alpha();
    let offset = dag.blend_offset();
    let blend = dag.blend_density(low);
    let reference = dag.reference(choice);
    let interpolated = dag.interpolated(high);
    let flat = dag.flat_cache(shifted);
    let cache_2d = dag.cache_2d(shift_a);
    let once = dag.cache_once(spline);
    let cell = dag.cache_all_in_cell(squeeze);
    let muted_offset = dag.mul(offset, zero);
    let muted_blend = dag.mul(zero, blend);

    let mut everything = zero;
    for node in [
        abs, half, quarter, clamp, reference, alpha, offset, blend, interpolated, flat, cache_2d, once, cell,
        muted_offset, muted_blend,
    ] {
        everything = dag.max(everything, node);
    }
    let roots = [
        everything, zero, zero, zero, noise, shifted, flat, cache_2d, gradient, weird, once, interpolated, cell,
        spline, blend,
    ];

    let noises: FxHashMap<String, NoiseParameters> = [
        (A.to_owned(), NoiseParameters::new(-3, vec![1.0, 1.0])),
        (B.to_owned(), NoiseParameters::new(-5, vec![1.0])),
    ]
    .into_iter()
    .collect();

    NoiseGeneratorSettings {
        noise: NoiseSettings::new(-64, 384, 1, 2).unwrap(),
        default_block: blocks::STONE,
        default_fluid: blocks::WATER,
        sea_level: 63,
        ore_veins_enabled: false,
        use_legacy_random_source: false,
        noise_router: NoiseRouter::from_roots(Arc::new(dag), roots).unwrap(),
        noises: Arc::new(noises),
    }
}

fn random_contexts(count: usize, seed: u64) -> Vec<FunctionContext> {
    let mut random = Xoroshiro::from_seed(seed);
    (0..count)
        .map(|_| {
            FunctionContext::new(
                random.next_i32_bounded(60_000) - 30_000,
                random.next_i32_bounded(384) - 64,
                random.next_i32_bounded(60_000) - 30_000,
            )
        })
        .collect()
}

#[test]
fn test_values_stay_within_declared_range() {
    let state = RandomState::create(&every_node_settings(), 8_675_309).unwrap();
    let dag = &state.router().dag;
    let contexts = random_contexts(10_000, 3);

    for index in 0..dag.len() {
        let (min, max) = (dag.min_value(index), dag.max_value(index));
        assert!(min <= max, "node {index} has range {min}..{max}");
        // Splines evaluate in f32.
        let slack = 1e-6 * (1.0 + min.abs().max(max.abs()).min(1e6));
        for ctx in &contexts {
            let value = dag.evaluate(index, ctx);
            assert!(
                value >= min - slack && value <= max + slack,
                "node {index} ({:?}) produced {value} outside {min}..{max} at {ctx:?}",
                dag.nodes()[index]
            );
        }
    }
}

#[test]
fn test_batch_matches_single_evaluation() {
    let state = RandomState::create(&every_node_settings(), 77).unwrap();
    let router = state.router();
    let contexts = random_contexts(512, 9);
    for root in router.roots() {
        let mut batch = vec![0.0; contexts.len()];
        router.dag.evaluate_batch(root, &mut batch, &contexts);
        for (ctx, value) in contexts.iter().zip(batch) {
            assert_eq!(value.to_bits(), router.dag.evaluate(root, ctx).to_bits());
        }
    }
}

/// Pure evaluation that records which nodes were sampled.
struct Recording<'a> {
    nodes: &'a [DensityFunction],
    sampled: Vec<usize>,
}

impl DensityStack for Recording<'_> {
    fn sample_at(&mut self, index: usize, ctx: &FunctionContext, options: &SampleOptions) -> f64 {
        self.sampled.push(index);
        let nodes = self.nodes;
        nodes[index].sample(self, ctx, options)
    }

    fn fill_at(
        &mut self,
        index: usize,
        out: &mut [f64],
        provider: &dyn ContextProvider,
        options: &mut SampleOptions,
    ) {
        let nodes = self.nodes;
        nodes[index].fill(self, out, provider, options);
    }

    fn min_at(&self, index: usize) -> f64 {
        self.nodes[index].min_value()
    }

    fn max_at(&self, index: usize) -> f64 {
        self.nodes[index].max_value()
    }
}

fn sampled_nodes(dag: &DensityDag, root: usize, ctx: &FunctionContext) -> (f64, Vec<usize>) {
    let mut recording = Recording {
        nodes: dag.nodes(),
        sampled: Vec::new(),
    };
    let value = recording.sample_at(root, ctx, &SampleOptions::skip_cell_caches());
    (value, recording.sampled)
}

#[test]
fn test_range_choice_samples_one_branch() {
    let mut dag = DensityDag::new();
    let gradient = dag.y_clamped_gradient(0, 100, 0.0, 100.0);
    let low = dag.noise(A, 1.0, 1.0);
    let high = dag.noise(B, 1.0, 1.0);
    let choice = dag.range_choice(gradient, 0.0, 50.0, low, high);

    let (_, below) = sampled_nodes(&dag, choice, &FunctionContext::new(0, 10, 0));
    assert!(below.contains(&low) && !below.contains(&high));
    let (_, above) = sampled_nodes(&dag, choice, &FunctionContext::new(0, 90, 0));
    assert!(above.contains(&high) && !above.contains(&low));
    // The upper bound is exclusive.
    let (_, edge) = sampled_nodes(&dag, choice, &FunctionContext::new(0, 50, 0));
    assert!(edge.contains(&high) && !edge.contains(&low));
}

#[test]
fn test_min_max_mul_short_circuit() {
    let mut dag = DensityDag::new();
    let gradient = dag.y_clamped_gradient(0, 10, -10.0, 10.0);
    let noise = dag.noise(A, 1.0, 1.0);
    let min = dag.min(gradient, noise);
    let max = dag.max(gradient, noise);
    let mul = dag.mul(gradient, noise);

    // Unbound noise is declared within -2..2.
    let (value, sampled) = sampled_nodes(&dag, min, &FunctionContext::new(0, 0, 0));
    assert_eq!(value, -10.0);
    assert!(!sampled.contains(&noise));
    let (value, sampled) = sampled_nodes(&dag, max, &FunctionContext::new(0, 10, 0));
    assert_eq!(value, 10.0);
    assert!(!sampled.contains(&noise));
    let (value, sampled) = sampled_nodes(&dag, mul, &FunctionContext::new(0, 5, 0));
    assert_eq!(value, 0.0);
    assert!(!sampled.contains(&noise));

    let (_, sampled) = sampled_nodes(&dag, min, &FunctionContext::new(0, 6, 0));
    assert!(sampled.contains(&noise));
}

#[test]
fn test_interpolated_values_stay_within_corners() {
    let mut settings = every_node_settings();
    let mut dag = (*settings.noise_router.dag).clone();
    let noise = dag.noise(A, 1.0, 1.0);
    let interpolated = dag.interpolated(noise);
    let mut roots = settings.noise_router.roots();
    roots[1] = interpolated;
    settings.noise_router = NoiseRouter::from_roots(Arc::new(dag), roots).unwrap();
    let state = RandomState::create(&settings, 12).unwrap();
    let router = state.router();
    let (interpolated, input) = match &router.dag.nodes()[router.fluid_level_floodedness] {
        DensityFunction::Marker(marker) => (router.fluid_level_floodedness, marker.wrapped),
        other => panic!("expected a marker, got {other:?}"),
    };

    let (h, v) = (4, 8);
    let build = ChunkBuildOptions {
        horizontal_cell_blocks: h,
        vertical_cell_blocks: v,
        vertical_cell_count: 2,
        horizontal_cell_count: 1,
        start_biome_x: 0,
        start_biome_z: 0,
        horizontal_biome_end: 4,
    };
    let blender = NoBlending;
    let mut chunk = ChunkRouter::generate(&router.dag, &build, &blender);
    let mut options = SampleOptions::new(false, SampleAction::CellCaches(CellOffsets::new(0, 0, 0, h, v)), 0, 1, 0);
    for (start, block_x) in [(true, 0), (false, 4)] {
        for cell_z in 0..=1 {
            let column = CornerColumn {
                block_x,
                block_z: cell_z as i32 * 4,
                min_cell_y: 0,
                vertical_cell_blocks: 8,
            };
            chunk.fill_interpolator_buffers(start, cell_z, &column, &mut options);
        }
    }
    chunk.on_sampled_cell_corners(0, 0);

    let mut corners = Vec::new();
    for x in [0, 4] {
        for y in [0, 8] {
            for z in [0, 4] {
                corners.push(router.dag.evaluate(input, &FunctionContext::new(x, y, z)));
            }
        }
    }
    let low = corners.iter().copied().fold(f64::INFINITY, f64::min);
    let high = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    for y in 0..8 {
        chunk.interpolate_y(f64::from(y) / 8.0);
        for x in 0..4 {
            chunk.interpolate_x(f64::from(x) / 4.0);
            for z in 0..4 {
                chunk.interpolate_z(f64::from(z) / 4.0);
                let ctx = FunctionContext::new(x, y, z);
                let value = chunk.sample(interpolated, &ctx, &options);
                assert!(value >= low - 1e-12 && value <= high + 1e-12, "{value} outside {low}..{high}");
                if (x, y, z) == (0, 0, 0) {
                    assert_eq!(value, corners[0]);
                }
            }
        }
    }

    // Factors of one reach the far side of the cell, which is the next cell's origin.
    for (x, y, z) in [(1, 1, 1), (1, 0, 1), (0, 1, 0), (1, 0, 0), (0, 0, 1)] {
        chunk.interpolate_y(f64::from(y));
        chunk.interpolate_x(f64::from(x));
        chunk.interpolate_z(f64::from(z));
        let ctx = FunctionContext::new(x * h as i32, y * v as i32, z * h as i32);
        let value = chunk.sample(interpolated, &ctx, &options);
        let expected = corners[(x * 4 + y * 2 + z) as usize];
        assert_eq!(expected, router.dag.evaluate(input, &ctx));
        assert!(
            (value - expected).abs() <= 1e-12 * (1.0 + expected.abs()),
            "corner ({x}, {y}, {z}) interpolated to {value}, expected {expected}"
        );
    }
}

#[test]
fn test_column_caches_match_pure_evaluation() {
    let mut settings = every_node_settings();
    let mut dag = (*settings.noise_router.dag).clone();
    let column = dag.noise(A, 1.0, 0.0);
    let flat = dag.flat_cache(column);
    let cached = dag.cache_2d(column);
    let once = dag.cache_once(column);
    let mut roots = settings.noise_router.roots();
    roots[1] = flat;
    roots[2] = cached;
    roots[3] = once;
    settings.noise_router = NoiseRouter::from_roots(Arc::new(dag), roots).unwrap();
    let state = RandomState::create(&settings, 31).unwrap();
    let router = state.router();

    let build = ChunkBuildOptions {
        horizontal_cell_blocks: 4,
        vertical_cell_blocks: 8,
        vertical_cell_count: 48,
        horizontal_cell_count: 4,
        start_biome_x: 4,
        start_biome_z: -8,
        horizontal_biome_end: 4,
    };
    let blender = NoBlending;
    let mut chunk = ChunkRouter::generate(&router.dag, &build, &blender);
    let options = SampleOptions::skip_cell_caches();
    for biome_x in 0..=4 {
        for biome_z in 0..=4 {
            let ctx = FunctionContext::new((4 + biome_x) * 4, 17, (biome_z - 8) * 4);
            let expected = router.dag.evaluate(router.fluid_level_floodedness, &ctx);
            for root in [router.fluid_level_floodedness, router.fluid_level_spread, router.lava] {
                assert_eq!(chunk.sample(root, &ctx, &options).to_bits(), expected.to_bits());
            }
        }
    }
}
