//! Built-in generator settings.
//!
//! - [`flat`] - a single solid layer, no caves, no fluids
//! - [`overworld`] - continents, ridges and caves driven by every marker kind

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::block::blocks;
use crate::density::{CubicSpline, DensityDag, RarityValueMapper, SplinePoint};
use crate::error::DensityError;
use crate::noise::{BlendedNoiseParameters, NoiseParameters};
use crate::router::NoiseRouter;
use crate::settings::{MAX_BUILD_HEIGHT, NoiseGeneratorSettings, NoiseSettings};

/// Noise parameter keys.
pub mod keys {
    /// Temperature.
    pub const TEMPERATURE: &str = "minecraft:temperature";
    /// Vegetation.
    pub const VEGETATION: &str = "minecraft:vegetation";
    /// Continentalness.
    pub const CONTINENTALNESS: &str = "minecraft:continentalness";
    /// Erosion.
    pub const EROSION: &str = "minecraft:erosion";
    /// Ridges.
    pub const RIDGE: &str = "minecraft:ridge";
    /// Coordinate shift.
    pub const SHIFT: &str = "minecraft:offset";
    /// Mountain peaks.
    pub const JAGGED: &str = "minecraft:jagged";
    /// Aquifer barriers.
    pub const AQUIFER_BARRIER: &str = "minecraft:aquifer_barrier";
    /// Aquifer floodedness.
    pub const AQUIFER_FLUID_LEVEL_FLOODEDNESS: &str = "minecraft:aquifer_fluid_level_floodedness";
    /// Aquifer level spread.
    pub const AQUIFER_FLUID_LEVEL_SPREAD: &str = "minecraft:aquifer_fluid_level_spread";
    /// Aquifer lava.
    pub const AQUIFER_LAVA: &str = "minecraft:aquifer_lava";
    /// Ore vein toggle.
    pub const ORE_VEININESS: &str = "minecraft:ore_veininess";
    /// First ore vein ridge.
    pub const ORE_VEIN_A: &str = "minecraft:ore_vein_a";
    /// Second ore vein ridge.
    pub const ORE_VEIN_B: &str = "minecraft:ore_vein_b";
    /// Ore vein gaps.
    pub const ORE_GAP: &str = "minecraft:ore_gap";
    /// Cave entrances.
    pub const CAVE_ENTRANCE: &str = "minecraft:cave_entrance";
    /// Cave layers.
    pub const CAVE_LAYER: &str = "minecraft:cave_layer";
    /// Cheese caves.
    pub const CAVE_CHEESE: &str = "minecraft:cave_cheese";
    /// Spaghetti tunnel rarity.
    pub const SPAGHETTI_3D_RARITY: &str = "minecraft:spaghetti_3d_rarity";
    /// First spaghetti tunnel.
    pub const SPAGHETTI_3D_1: &str = "minecraft:spaghetti_3d_1";
    /// Second spaghetti tunnel.
    pub const SPAGHETTI_3D_2: &str = "minecraft:spaghetti_3d_2";
    /// Spaghetti tunnel thickness.
    pub const SPAGHETTI_3D_THICKNESS: &str = "minecraft:spaghetti_3d_thickness";
    /// Spaghetti wall roughness.
    pub const SPAGHETTI_ROUGHNESS: &str = "minecraft:spaghetti_roughness";
    /// Spaghetti roughness modulator.
    pub const SPAGHETTI_ROUGHNESS_MODULATOR: &str = "minecraft:spaghetti_roughness_modulator";
    /// Flat spaghetti caves.
    pub const SPAGHETTI_2D: &str = "minecraft:spaghetti_2d";
    /// Flat spaghetti rarity.
    pub const SPAGHETTI_2D_MODULATOR: &str = "minecraft:spaghetti_2d_modulator";
    /// Flat spaghetti thickness.
    pub const SPAGHETTI_2D_THICKNESS: &str = "minecraft:spaghetti_2d_thickness";
    /// Noodle caves toggle.
    pub const NOODLE: &str = "minecraft:noodle";
    /// Noodle thickness.
    pub const NOODLE_THICKNESS: &str = "minecraft:noodle_thickness";
    /// First noodle ridge.
    pub const NOODLE_RIDGE_A: &str = "minecraft:noodle_ridge_a";
    /// Second noodle ridge.
    pub const NOODLE_RIDGE_B: &str = "minecraft:noodle_ridge_b";
}

/// Vanilla's noise parameter registry for the keys the overworld uses.
#[must_use]
pub fn overworld_noises() -> FxHashMap<String, NoiseParameters> {
    let single = |first_octave: i32| NoiseParameters::new(first_octave, vec![1.0]);
    [
        (keys::TEMPERATURE, NoiseParameters::new(-10, vec![1.5, 0.0, 1.0, 0.0, 0.0, 0.0])),
        (keys::VEGETATION, NoiseParameters::new(-8, vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0])),
        (
            keys::CONTINENTALNESS,
            NoiseParameters::new(-9, vec![1.0, 1.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0]),
        ),
        (keys::EROSION, NoiseParameters::new(-9, vec![1.0, 1.0, 0.0, 1.0, 1.0])),
        (keys::RIDGE, NoiseParameters::new(-7, vec![1.0, 2.0, 1.0, 0.0, 0.0, 0.0])),
        (keys::SHIFT, NoiseParameters::new(-3, vec![1.0, 1.0, 1.0, 0.0])),
        (keys::JAGGED, NoiseParameters::new(-16, vec![1.0; 16])),
        (keys::AQUIFER_BARRIER, single(-3)),
        (keys::AQUIFER_FLUID_LEVEL_FLOODEDNESS, single(-7)),
        (keys::AQUIFER_FLUID_LEVEL_SPREAD, single(-5)),
        (keys::AQUIFER_LAVA, single(-1)),
        (keys::ORE_VEININESS, single(-8)),
        (keys::ORE_VEIN_A, single(-7)),
        (keys::ORE_VEIN_B, single(-7)),
        (keys::ORE_GAP, single(-5)),
        (keys::CAVE_ENTRANCE, NoiseParameters::new(-7, vec![0.4, 0.5, 1.0])),
        (keys::CAVE_LAYER, single(-8)),
        (
            keys::CAVE_CHEESE,
            NoiseParameters::new(-8, vec![0.5, 1.0, 2.0, 1.0, 2.0, 1.0, 0.0, 2.0, 0.0]),
        ),
        (keys::SPAGHETTI_3D_RARITY, single(-11)),
        (keys::SPAGHETTI_3D_1, single(-7)),
        (keys::SPAGHETTI_3D_2, single(-7)),
        (keys::SPAGHETTI_3D_THICKNESS, single(-8)),
        (keys::SPAGHETTI_ROUGHNESS, single(-5)),
        (keys::SPAGHETTI_ROUGHNESS_MODULATOR, single(-8)),
        (keys::SPAGHETTI_2D, single(-7)),
        (keys::SPAGHETTI_2D_MODULATOR, single(-11)),
        (keys::SPAGHETTI_2D_THICKNESS, single(-11)),
        (keys::NOODLE, single(-8)),
        (keys::NOODLE_THICKNESS, single(-8)),
        (keys::NOODLE_RIDGE_A, single(-7)),
        (keys::NOODLE_RIDGE_B, single(-7)),
    ]
    .into_iter()
    .map(|(key, parameters)| (key.to_owned(), parameters))
    .collect()
}

/// A world made of `layers` solid blocks from Y 0 up.
///
/// Final density is `layers - 0.5 - y`, so every column is solid below
/// `layers` and air above. Sea level sits at the bottom, so no fluid is
/// placed. The volume is the smallest multiple of 16 with air on top.
///
/// # Errors
/// Returns [`DensityError::InvalidSettings`] if the volume would leave the
/// build limits.
pub fn flat(layers: u32) -> Result<NoiseGeneratorSettings, DensityError> {
    let layers = i32::try_from(layers)
        .ok()
        .filter(|&layers| layers < MAX_BUILD_HEIGHT)
        .ok_or_else(|| DensityError::InvalidSettings(format!("{layers} layers exceed the build height")))?;
    let height = (layers / 16 + 1) * 16;
    let noise = NoiseSettings::new(0, height, 1, 2)?;

    let mut dag = DensityDag::new();
    let zero = dag.constant(0.0);
    let top = f64::from(layers) - 0.5;
    let gradient = dag.y_clamped_gradient(0, height, top, top - f64::from(height));
    let final_density = dag.interpolated(gradient);
    let surface = dag.constant(f64::from(layers));

    let mut roots = [zero; 15];
    roots[10] = surface;
    roots[11] = final_density;

    Ok(NoiseGeneratorSettings {
        noise,
        default_block: blocks::STONE,
        default_fluid: blocks::WATER,
        sea_level: 0,
        ore_veins_enabled: false,
        use_legacy_random_source: false,
        noise_router: NoiseRouter::from_roots(Arc::new(dag), roots)?,
        noises: Arc::new(FxHashMap::default()),
    })
}

fn add_constant(dag: &mut DensityDag, input: usize, value: f64) -> usize {
    let constant = dag.constant(value);
    dag.add(input, constant)
}

fn mul_constant(dag: &mut DensityDag, input: usize, value: f64) -> usize {
    let constant = dag.constant(value);
    dag.mul(input, constant)
}

/// `start + alpha * (end - start)`
fn lerp(dag: &mut DensityDag, alpha: usize, start: usize, end: usize) -> usize {
    let negated = mul_constant(dag, start, -1.0);
    let span = dag.add(end, negated);
    let scaled = dag.mul(alpha, span);
    dag.add(start, scaled)
}

/// Flattens the top and bottom of the world towards fixed densities.
fn slide(dag: &mut DensityDag, input: usize, min_y: i32, height: i32) -> usize {
    let max_y = min_y + height;
    let top_factor = dag.y_clamped_gradient(max_y - 80, max_y - 64, 1.0, 0.0);
    let top_value = dag.constant(-0.078_125);
    let topped = lerp(dag, top_factor, top_value, input);
    let bottom_factor = dag.y_clamped_gradient(min_y, min_y + 24, 0.0, 1.0);
    let bottom_value = dag.constant(0.117_187_5);
    lerp(dag, bottom_factor, bottom_value, topped)
}

/// Noise sampled only inside `-60..max_y`, `outside` elsewhere, interpolated.
fn y_limited_interpolated(dag: &mut DensityDag, y: usize, input: usize, max_y: f64, outside: f64) -> usize {
    let outside = dag.constant(outside);
    let choice = dag.range_choice(y, -60.0, max_y, input, outside);
    dag.interpolated(choice)
}

struct Climate {
    continents: usize,
    erosion: usize,
    ridges: usize,
    temperature: usize,
    vegetation: usize,
}

fn climate(dag: &mut DensityDag) -> Climate {
    let zero = dag.constant(0.0);
    let shift_a = dag.shift_a(keys::SHIFT);
    let shift_a = dag.cache_2d(shift_a);
    let shift_x = dag.flat_cache(shift_a);
    let shift_b = dag.shift_b(keys::SHIFT);
    let shift_b = dag.cache_2d(shift_b);
    let shift_z = dag.flat_cache(shift_b);
    let shifts = [shift_x, zero, shift_z];

    let flat_shifted = |dag: &mut DensityDag, key: &str| {
        let noise = dag.shifted_noise(key, shifts, 0.25, 0.0);
        dag.flat_cache(noise)
    };
    Climate {
        continents: flat_shifted(dag, keys::CONTINENTALNESS),
        erosion: flat_shifted(dag, keys::EROSION),
        ridges: flat_shifted(dag, keys::RIDGE),
        temperature: dag.shifted_noise(keys::TEMPERATURE, shifts, 0.25, 0.0),
        vegetation: dag.shifted_noise(keys::VEGETATION, shifts, 0.25, 0.0),
    }
}

/// `-3 * (| |ridges| - 2/3 | - 1/3)`, 1 on peaks and -1 in valleys.
fn peaks_and_valleys(dag: &mut DensityDag, ridges: usize) -> usize {
    let folded = dag.abs(ridges);
    let folded = add_constant(dag, folded, -2.0 / 3.0);
    let folded = dag.abs(folded);
    let folded = add_constant(dag, folded, -1.0 / 3.0);
    mul_constant(dag, folded, -3.0)
}

struct Shape {
    offset: usize,
    factor: usize,
    jaggedness: usize,
}

fn terrain_shape(dag: &mut DensityDag, climate: &Climate, ridges_folded: usize) -> Shape {
    let alpha = dag.blend_alpha();
    let blend_offset = dag.blend_offset();

    let inland = CubicSpline::new(
        ridges_folded,
        vec![
            SplinePoint::constant(-1.0, -0.05, 0.5),
            SplinePoint::constant(0.4, 0.35, 0.8),
            SplinePoint::constant(1.0, 0.7, 0.0),
        ],
    );
    let by_erosion = CubicSpline::new(
        climate.erosion,
        vec![
            SplinePoint::nested(-0.6, inland, 0.0),
            SplinePoint::constant(-0.2, 0.15, 0.0),
            SplinePoint::constant(0.45, 0.02, 0.0),
            SplinePoint::constant(0.8, -0.05, 0.0),
        ],
    );
    let offset_spline = dag.spline(CubicSpline::new(
        climate.continents,
        vec![
            SplinePoint::constant(-1.1, 0.044, 0.0),
            SplinePoint::constant(-1.02, -0.2222, 0.0),
            SplinePoint::constant(-0.51, -0.2222, 0.0),
            SplinePoint::constant(-0.44, -0.12, 0.0),
            SplinePoint::constant(-0.18, -0.12, 0.0),
            SplinePoint::nested(-0.16, by_erosion.clone(), 0.0),
            SplinePoint::nested(1.0, by_erosion, 0.0),
        ],
    ));
    let offset = add_constant(dag, offset_spline, -0.503_75);
    let offset = lerp(dag, alpha, blend_offset, offset);
    let offset = dag.cache_2d(offset);
    let offset = dag.flat_cache(offset);

    let factor_by_erosion = CubicSpline::new(
        climate.erosion,
        vec![
            SplinePoint::constant(-0.6, 6.25, 0.0),
            SplinePoint::constant(-0.5, 5.47, 0.0),
            SplinePoint::constant(-0.35, 5.08, 0.0),
            SplinePoint::constant(-0.1, 4.69, 0.0),
            SplinePoint::constant(0.45, 5.47, 0.0),
            SplinePoint::constant(0.7, 6.3, 0.0),
        ],
    );
    let factor_spline = dag.spline(CubicSpline::new(
        climate.continents,
        vec![
            SplinePoint::constant(-0.19, 3.95, 0.0),
            SplinePoint::nested(-0.15, factor_by_erosion, 0.0),
        ],
    ));
    let default_factor = dag.constant(10.0);
    let factor = lerp(dag, alpha, default_factor, factor_spline);
    let factor = dag.cache_2d(factor);
    let factor = dag.flat_cache(factor);

    let peaks = CubicSpline::new(
        ridges_folded,
        vec![
            SplinePoint::constant(0.2, 0.0, 0.0),
            SplinePoint::constant(0.45, 0.3, 0.0),
            SplinePoint::constant(1.0, 0.63, 0.0),
        ],
    );
    let jaggedness_spline = dag.spline(CubicSpline::new(
        climate.continents,
        vec![
            SplinePoint::constant(-0.11, 0.0, 0.0),
            SplinePoint::nested(0.03, peaks, 0.0),
        ],
    ));
    let zero = dag.constant(0.0);
    let jaggedness = lerp(dag, alpha, zero, jaggedness_spline);
    let jaggedness = dag.cache_2d(jaggedness);
    let jaggedness = dag.flat_cache(jaggedness);

    Shape {
        offset,
        factor,
        jaggedness,
    }
}

fn spaghetti_roughness(dag: &mut DensityDag) -> usize {
    let modulator = dag.noise(keys::SPAGHETTI_ROUGHNESS_MODULATOR, 1.0, 1.0);
    let modulator = mul_constant(dag, modulator, -0.05);
    let modulator = add_constant(dag, modulator, -0.05);
    let roughness = dag.noise(keys::SPAGHETTI_ROUGHNESS, 1.0, 1.0);
    let roughness = dag.abs(roughness);
    let roughness = add_constant(dag, roughness, -0.4);
    let product = dag.mul(modulator, roughness);
    dag.cache_all_in_cell(product)
}

fn entrances(dag: &mut DensityDag, roughness: usize) -> usize {
    let rarity = dag.noise(keys::SPAGHETTI_3D_RARITY, 2.0, 1.0);
    let rarity = dag.cache_once(rarity);
    let first = dag.weird_scaled(rarity, keys::SPAGHETTI_3D_1, RarityValueMapper::Tunnels);
    let second = dag.weird_scaled(rarity, keys::SPAGHETTI_3D_2, RarityValueMapper::Tunnels);
    let thickness = dag.noise(keys::SPAGHETTI_3D_THICKNESS, 1.0, 1.0);
    let thickness = mul_constant(dag, thickness, -0.0115);
    let thickness = add_constant(dag, thickness, -0.0765);
    let tunnels = dag.max(first, second);
    let tunnels = dag.add(tunnels, thickness);
    let tunnels = dag.clamp(tunnels, -1.0, 1.0);

    let entrance = dag.noise(keys::CAVE_ENTRANCE, 0.75, 0.5);
    let entrance = add_constant(dag, entrance, 0.37);
    let fade = dag.y_clamped_gradient(-10, 30, 0.3, 0.0);
    let entrance = dag.add(entrance, fade);

    let rough_tunnels = dag.add(roughness, tunnels);
    let entrances = dag.min(entrance, rough_tunnels);
    dag.cache_once(entrances)
}

fn underground(dag: &mut DensityDag, entrances: usize, roughness: usize) -> usize {
    let layer = dag.noise(keys::CAVE_LAYER, 1.0, 8.0);
    let layer = dag.square(layer);
    let layer = mul_constant(dag, layer, 4.0);
    let cheese = dag.noise(keys::CAVE_CHEESE, 1.0, 0.666_666_666_666_666_6);
    let cheese = add_constant(dag, cheese, 0.27);
    let cheese = dag.clamp(cheese, -1.0, 1.0);
    let cheese = dag.add(layer, cheese);

    let rarity = dag.noise(keys::SPAGHETTI_2D_MODULATOR, 2.0, 1.0);
    let flat_tunnels = dag.weird_scaled(rarity, keys::SPAGHETTI_2D, RarityValueMapper::Caves);
    let thickness = dag.noise(keys::SPAGHETTI_2D_THICKNESS, 2.0, 1.0);
    let thickness = mul_constant(dag, thickness, -0.35);
    let thickness = add_constant(dag, thickness, -0.95);
    let flat_tunnels = dag.add(flat_tunnels, thickness);
    let flat_tunnels = dag.clamp(flat_tunnels, -1.0, 1.0);
    let flat_tunnels = dag.add(flat_tunnels, roughness);

    let caves = dag.min(cheese, entrances);
    dag.min(caves, flat_tunnels)
}

fn noodle(dag: &mut DensityDag, y: usize) -> usize {
    let toggle = dag.noise(keys::NOODLE, 1.0, 1.0);
    let toggle = y_limited_interpolated(dag, y, toggle, 321.0, -1.0);
    let thickness = dag.noise(keys::NOODLE_THICKNESS, 1.0, 1.0);
    let thickness = mul_constant(dag, thickness, -0.025);
    let thickness = add_constant(dag, thickness, -0.075);
    let thickness = y_limited_interpolated(dag, y, thickness, 321.0, 0.0);

    let ridge_scale = 2.666_666_666_666_666_5;
    let ridge_a = dag.noise(keys::NOODLE_RIDGE_A, ridge_scale, ridge_scale);
    let ridge_a = y_limited_interpolated(dag, y, ridge_a, 321.0, 0.0);
    let ridge_a = dag.abs(ridge_a);
    let ridge_b = dag.noise(keys::NOODLE_RIDGE_B, ridge_scale, ridge_scale);
    let ridge_b = y_limited_interpolated(dag, y, ridge_b, 321.0, 0.0);
    let ridge_b = dag.abs(ridge_b);
    let ridged = dag.max(ridge_a, ridge_b);
    let ridged = mul_constant(dag, ridged, 1.5);

    let solid = dag.constant(64.0);
    let open = dag.add(thickness, ridged);
    dag.range_choice(toggle, -1_000_000.0, 0.0, solid, open)
}

struct Veins {
    toggle: usize,
    ridged: usize,
    gap: usize,
}

fn veins(dag: &mut DensityDag, y: usize) -> Veins {
    let veininess = dag.noise(keys::ORE_VEININESS, 1.5, 1.5);
    let toggle = y_limited_interpolated(dag, y, veininess, 51.0, 0.0);
    let vein_a = dag.noise(keys::ORE_VEIN_A, 4.0, 4.0);
    let vein_a = y_limited_interpolated(dag, y, vein_a, 51.0, 0.0);
    let vein_a = dag.abs(vein_a);
    let vein_b = dag.noise(keys::ORE_VEIN_B, 4.0, 4.0);
    let vein_b = y_limited_interpolated(dag, y, vein_b, 51.0, 0.0);
    let vein_b = dag.abs(vein_b);
    let ridged = dag.max(vein_a, vein_b);
    let ridged = add_constant(dag, ridged, -0.08);
    Veins {
        toggle,
        ridged,
        gap: dag.noise(keys::ORE_GAP, 1.0, 1.0),
    }
}

/// A vanilla-like overworld from Y -64 to 320 with sea level 63.
///
/// # Errors
/// Never fails for the built-in shape; the result type matches the other
/// presets.
pub fn overworld() -> Result<NoiseGeneratorSettings, DensityError> {
    let noise = NoiseSettings::new(-64, 384, 1, 2)?;
    let mut dag = DensityDag::new();

    let y = dag.y_clamped_gradient(-4064, 4062, -4064.0, 4062.0);
    let climate = climate(&mut dag);
    let ridges_folded = peaks_and_valleys(&mut dag, climate.ridges);
    let shape = terrain_shape(&mut dag, &climate, ridges_folded);

    let gradient = dag.y_clamped_gradient(-64, 320, 1.5, -1.5);
    let depth = dag.add(gradient, shape.offset);

    let jagged = dag.noise(keys::JAGGED, 1500.0, 0.0);
    let jagged = dag.half_negative(jagged);
    let jagged = dag.mul(shape.jaggedness, jagged);
    let shaped = dag.add(depth, jagged);
    let shaped = dag.mul(shaped, shape.factor);
    let shaped = dag.quarter_negative(shaped);
    let shaped = mul_constant(&mut dag, shaped, 4.0);
    let base = dag.blended_noise(BlendedNoiseParameters {
        xz_scale: 0.25,
        y_scale: 0.125,
        xz_factor: 80.0,
        y_factor: 160.0,
        smear_scale_multiplier: 8.0,
    });
    let sloped_cheese = dag.add(shaped, base);
    let sloped_ref = dag.reference(sloped_cheese);

    let roughness = spaghetti_roughness(&mut dag);
    let entrances = entrances(&mut dag, roughness);
    let underground = underground(&mut dag, entrances, roughness);
    let surface_entrances = mul_constant(&mut dag, entrances, 5.0);
    let near_surface = dag.min(sloped_ref, surface_entrances);
    let terrain = dag.range_choice(sloped_cheese, -1_000_000.0, 1.5625, near_surface, underground);

    let slid = slide(&mut dag, terrain, noise.min_y, noise.height);
    let blended = dag.blend_density(slid);
    let interpolated = dag.interpolated(blended);
    let scaled = mul_constant(&mut dag, interpolated, 0.64);
    let post_processed = dag.squeeze(scaled);
    let noodle = noodle(&mut dag, y);
    let final_density = dag.min(post_processed, noodle);

    let surface = mul_constant(&mut dag, shape.offset, 128.0);
    let surface = add_constant(&mut dag, surface, 128.0);
    let surface = dag.cache_2d(surface);

    let veins = veins(&mut dag, y);

    let barrier = dag.noise(keys::AQUIFER_BARRIER, 1.0, 0.5);
    let floodedness = dag.noise(keys::AQUIFER_FLUID_LEVEL_FLOODEDNESS, 1.0, 0.67);
    let spread = dag.noise(keys::AQUIFER_FLUID_LEVEL_SPREAD, 1.0, 0.714_285_714_285_714_3);
    let lava = dag.noise(keys::AQUIFER_LAVA, 1.0, 1.0);

    let roots = [
        barrier,
        floodedness,
        spread,
        lava,
        climate.temperature,
        climate.vegetation,
        climate.continents,
        climate.erosion,
        depth,
        climate.ridges,
        surface,
        final_density,
        veins.toggle,
        veins.ridged,
        veins.gap,
    ];
    log::debug!("built overworld template with {} density nodes", dag.len());

    Ok(NoiseGeneratorSettings {
        noise,
        default_block: blocks::STONE,
        default_fluid: blocks::WATER,
        sea_level: 63,
        ore_veins_enabled: true,
        use_legacy_random_source: false,
        noise_router: NoiseRouter::from_roots(Arc::new(dag), roots)?,
        noises: Arc::new(overworld_noises()),
    })
}
