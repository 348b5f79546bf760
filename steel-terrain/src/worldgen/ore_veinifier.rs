//! Large copper and iron ore veins placed during the noise stage.
//!
//! | Vein | Y range | Ore | Filler |
//! |------|---------|-----|--------|
//! | Copper | 0 to 50 | copper ore | granite |
//! | Iron | -60 to -8 | iron ore | tuff |
//!
//! `vein_toggle` picks the vein type by sign and its magnitude decides
//! whether a block is inside a vein. `vein_ridged` must be negative for ore,
//! and `vein_gap` punches holes into the ore.

use steel_density::BlockStateId;
use steel_density::block::blocks;
use steel_density::density::chunk::ChunkRouter;
use steel_density::density::{FunctionContext, SampleOptions};
use steel_density::math::clamped_map;
use steel_density::random::{PositionalRandom, Random, RandomSplitter};
use steel_density::router::NoiseRouter;

struct VeinType {
    ore: BlockStateId,
    deepslate_ore: BlockStateId,
    raw_ore_block: BlockStateId,
    filler: BlockStateId,
    min_y: i32,
    max_y: i32,
}

const COPPER: VeinType = VeinType {
    ore: blocks::COPPER_ORE,
    deepslate_ore: blocks::DEEPSLATE_COPPER_ORE,
    raw_ore_block: blocks::RAW_COPPER_BLOCK,
    filler: blocks::GRANITE,
    min_y: 0,
    max_y: 50,
};

const IRON: VeinType = VeinType {
    ore: blocks::IRON_ORE,
    deepslate_ore: blocks::DEEPSLATE_IRON_ORE,
    raw_ore_block: blocks::RAW_IRON_BLOCK,
    filler: blocks::TUFF,
    min_y: -60,
    max_y: -8,
};

// Vanilla compares against float literals widened to double.
const VEININESS_THRESHOLD: f64 = 0.4_f32 as f64;
const EDGE_ROUNDOFF_BEGIN: f64 = 20.0;
const MAX_EDGE_ROUNDOFF: f64 = 0.2_f32 as f64;
const VEIN_SOLIDNESS: f32 = 0.7;
const MIN_RICHNESS: f64 = 0.1_f32 as f64;
const MAX_RICHNESS: f64 = 0.3_f32 as f64;
const MAX_RICHNESS_THRESHOLD: f64 = 0.6_f32 as f64;
const CHANCE_OF_RAW_ORE_BLOCK: f32 = 0.02;
const SKIP_ORE_IF_GAP_NOISE_IS_BELOW: f64 = -0.3_f32 as f64;

/// Places ore veins into solid terrain.
pub struct OreVeinifier {
    random: RandomSplitter,
}

impl OreVeinifier {
    /// Creates a veinifier drawing from the ore positional stream.
    #[must_use]
    pub const fn new(random: RandomSplitter) -> Self {
        Self { random }
    }

    /// The vein block at `ctx`, or `None` to keep the default block.
    pub fn compute(
        &self,
        chunk: &mut ChunkRouter<'_>,
        router: &NoiseRouter,
        ctx: &FunctionContext,
        options: &SampleOptions,
    ) -> Option<BlockStateId> {
        let toggle = chunk.sample(router.vein_toggle, ctx, options);
        let y = ctx.block_y;
        let vein = if toggle > 0.0 { &COPPER } else { &IRON };

        let distance_to_top = vein.max_y - y;
        let distance_to_bottom = y - vein.min_y;
        if distance_to_top < 0 || distance_to_bottom < 0 {
            return None;
        }

        let distance = f64::from(distance_to_top.min(distance_to_bottom));
        let edge_roundoff = clamped_map(distance, 0.0, EDGE_ROUNDOFF_BEGIN, -MAX_EDGE_ROUNDOFF, 0.0);
        let veininess = toggle.abs();
        if veininess + edge_roundoff < VEININESS_THRESHOLD {
            return None;
        }

        let mut random = self.random.at(ctx.block_x, y, ctx.block_z);
        if random.next_f32() > VEIN_SOLIDNESS {
            return None;
        }
        if chunk.sample(router.vein_ridged, ctx, options) >= 0.0 {
            return None;
        }

        let richness = clamped_map(
            veininess,
            VEININESS_THRESHOLD,
            MAX_RICHNESS_THRESHOLD,
            MIN_RICHNESS,
            MAX_RICHNESS,
        );
        if f64::from(random.next_f32()) < richness
            && chunk.sample(router.vein_gap, ctx, options) > SKIP_ORE_IF_GAP_NOISE_IS_BELOW
        {
            return Some(if random.next_f32() < CHANCE_OF_RAW_ORE_BLOCK {
                vein.raw_ore_block
            } else if y < 0 {
                vein.deepslate_ore
            } else {
                vein.ore
            });
        }
        Some(vein.filler)
    }
}

#[cfg(test)]
mod tests {
    use steel_density::density::NoBlending;
    use steel_density::density::chunk::ChunkBuildOptions;
    use steel_density::{RandomState, presets};

    use super::*;

    fn options() -> ChunkBuildOptions {
        ChunkBuildOptions {
            horizontal_cell_blocks: 4,
            vertical_cell_blocks: 8,
            vertical_cell_count: 48,
            horizontal_cell_count: 4,
            start_biome_x: 0,
            start_biome_z: 0,
            horizontal_biome_end: 4,
        }
    }

    #[test]
    fn test_outside_vein_ranges() {
        let settings = presets::overworld().unwrap();
        let state = RandomState::create(&settings, 3).unwrap();
        let veins = OreVeinifier::new(*state.ore_random());
        let mut chunk = ChunkRouter::generate(&state.router().dag, &options(), &NoBlending);
        let skip = SampleOptions::skip_cell_caches();
        for x in 0..16 {
            for z in 0..16 {
                for y in [51, 80, -61, -64] {
                    let ctx = FunctionContext::new(x, y, z);
                    assert_eq!(veins.compute(&mut chunk, state.router(), &ctx, &skip), None);
                }
            }
        }
    }

    #[test]
    fn test_only_vein_blocks_are_placed() {
        let settings = presets::overworld().unwrap();
        let state = RandomState::create(&settings, 3).unwrap();
        let veins = OreVeinifier::new(*state.ore_random());
        let mut chunk = ChunkRouter::generate(&state.router().dag, &options(), &NoBlending);
        let skip = SampleOptions::skip_cell_caches();
        let allowed = [COPPER, IRON].map(|vein| [vein.ore, vein.deepslate_ore, vein.raw_ore_block, vein.filler]);
        for x in (-256..256).step_by(8) {
            for y in (-60..=50).step_by(5) {
                let ctx = FunctionContext::new(x, y, x / 3);
                if let Some(block) = veins.compute(&mut chunk, state.router(), &ctx, &skip) {
                    assert!(allowed.iter().flatten().any(|&allowed| allowed == block), "{block:?} at {x} {y}");
                }
            }
        }
    }
}
