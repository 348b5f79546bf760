//! Climate parameters and the sampler that reads them from the router.
//!
//! Climate values are compared as integers: every coordinate is truncated to
//! `f32`, scaled by 10000 and cast, exactly like vanilla's `Climate`.

use serde::{Deserialize, Serialize};
use steel_density::NoiseSettings;
use steel_density::density::chunk::{ChunkBuildOptions, ChunkRouter, biome_from_block};
use steel_density::density::{FunctionContext, NoBlending, SampleOptions};
use steel_density::router::NoiseRouter;

use crate::chunk::ChunkPos;

/// Converts a climate value to its integer form.
#[must_use]
pub fn quantize_coord(coord: f64) -> i64 {
    ((coord as f32) * 10000.0) as i64
}

/// A quantized climate sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TargetPoint {
    /// Temperature.
    pub temperature: i64,
    /// Humidity, read from the vegetation root.
    pub humidity: i64,
    /// Continentalness.
    pub continentalness: i64,
    /// Erosion.
    pub erosion: i64,
    /// Depth.
    pub depth: i64,
    /// Weirdness, read from the ridges root.
    pub weirdness: i64,
}

impl TargetPoint {
    /// Creates a target point from quantized values.
    #[must_use]
    pub const fn new(
        temperature: i64,
        humidity: i64,
        continentalness: i64,
        erosion: i64,
        depth: i64,
        weirdness: i64,
    ) -> Self {
        Self {
            temperature,
            humidity,
            continentalness,
            erosion,
            depth,
            weirdness,
        }
    }
}

/// An inclusive quantized range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Lower bound.
    pub min: i64,
    /// Upper bound.
    pub max: i64,
}

impl Parameter {
    /// A single value.
    #[must_use]
    pub fn point(value: f32) -> Self {
        Self::span(value, value)
    }

    /// The range `min..=max`.
    #[must_use]
    pub fn span(min: f32, max: f32) -> Self {
        Self {
            min: quantize_coord(f64::from(min)),
            max: quantize_coord(f64::from(max)),
        }
    }

    /// How far `target` lies outside the range; 0 inside.
    #[must_use]
    pub const fn distance(&self, target: i64) -> i64 {
        let above = target - self.max;
        let below = self.min - target;
        if above > 0 {
            above
        } else if below > 0 {
            below
        } else {
            0
        }
    }
}

/// The climate a biome is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterPoint {
    /// Temperature range.
    pub temperature: Parameter,
    /// Humidity range.
    pub humidity: Parameter,
    /// Continentalness range.
    pub continentalness: Parameter,
    /// Erosion range.
    pub erosion: Parameter,
    /// Depth range.
    pub depth: Parameter,
    /// Weirdness range.
    pub weirdness: Parameter,
    /// Penalty added to every match, quantized.
    pub offset: i64,
}

impl ParameterPoint {
    /// Squared distance from `target`. Lower is a better match.
    #[must_use]
    pub const fn fitness(&self, target: &TargetPoint) -> i64 {
        let t = self.temperature.distance(target.temperature);
        let h = self.humidity.distance(target.humidity);
        let c = self.continentalness.distance(target.continentalness);
        let e = self.erosion.distance(target.erosion);
        let d = self.depth.distance(target.depth);
        let w = self.weirdness.distance(target.weirdness);
        t * t + h * h + c * c + e * e + d * d + w * w + self.offset * self.offset
    }
}

/// Samples the six climate roots of a router.
///
/// Built for a chunk, it evaluates through that chunk's flat caches, which
/// are laid out at exactly the biome-cell positions biome assignment reads.
pub struct ClimateSampler<'a> {
    router: &'a NoiseRouter,
    chunk: Option<ChunkRouter<'a>>,
}

impl<'a> ClimateSampler<'a> {
    /// A sampler evaluating the router directly at any position.
    #[must_use]
    pub const fn new(router: &'a NoiseRouter) -> Self {
        Self { router, chunk: None }
    }

    /// A sampler caching column values for the biome cells of `pos`.
    #[must_use]
    pub fn for_chunk(router: &'a NoiseRouter, pos: ChunkPos, noise: &NoiseSettings) -> Self {
        let cell_width = noise.cell_width();
        let options = ChunkBuildOptions {
            horizontal_cell_blocks: cell_width as usize,
            vertical_cell_blocks: noise.cell_height() as usize,
            vertical_cell_count: noise.cell_count_y().max(0) as usize,
            horizontal_cell_count: (16 / cell_width) as usize,
            start_biome_x: biome_from_block(pos.min_block_x()),
            start_biome_z: biome_from_block(pos.min_block_z()),
            horizontal_biome_end: biome_from_block(16) as usize,
        };
        Self {
            router,
            chunk: Some(ChunkRouter::generate(&router.dag, &options, &NoBlending)),
        }
    }

    fn sample_root(&mut self, root: usize, ctx: &FunctionContext) -> f64 {
        match &mut self.chunk {
            Some(chunk) => chunk.sample(root, ctx, &SampleOptions::skip_cell_caches()),
            None => self.router.dag.evaluate(root, ctx),
        }
    }

    /// The climate at a quart position.
    pub fn sample(&mut self, quart_x: i32, quart_y: i32, quart_z: i32) -> TargetPoint {
        let ctx = FunctionContext::new(quart_x << 2, quart_y << 2, quart_z << 2);
        let router = self.router;
        let mut quantized = |root: usize| quantize_coord(f64::from(self.sample_root(root, &ctx) as f32));
        TargetPoint::new(
            quantized(router.temperature),
            quantized(router.vegetation),
            quantized(router.continents),
            quantized(router.erosion),
            quantized(router.depth),
            quantized(router.ridges),
        )
    }
}

#[cfg(test)]
mod tests {
    use steel_density::{RandomState, presets};

    use super::*;

    #[test]
    fn test_quantize_truncates_through_f32() {
        assert_eq!(quantize_coord(0.5), 5000);
        assert_eq!(quantize_coord(-0.123_45), -1234);
        assert_eq!(quantize_coord(1.0), 10000);
    }

    #[test]
    fn test_fitness() {
        let point = ParameterPoint {
            temperature: Parameter::span(-0.5, 0.5),
            humidity: Parameter::point(0.0),
            continentalness: Parameter::span(-1.0, 1.0),
            erosion: Parameter::span(-1.0, 1.0),
            depth: Parameter::point(0.0),
            weirdness: Parameter::span(-1.0, 1.0),
            offset: 0,
        };
        assert_eq!(point.fitness(&TargetPoint::default()), 0);
        let hot = TargetPoint {
            temperature: 6000,
            ..TargetPoint::default()
        };
        assert_eq!(point.fitness(&hot), 1000 * 1000);
    }

    #[test]
    fn test_chunk_sampler_matches_direct_sampler() {
        let settings = presets::overworld().unwrap();
        let state = RandomState::create(&settings, 7).unwrap();
        let pos = ChunkPos::new(3, -5);
        let mut cached = ClimateSampler::for_chunk(state.router(), pos, &settings.noise);
        let mut direct = ClimateSampler::new(state.router());
        for quart_x in 12..16 {
            for quart_z in -20..-16 {
                for quart_y in [-16, 0, 20] {
                    assert_eq!(
                        cached.sample(quart_x, quart_y, quart_z),
                        direct.sample(quart_x, quart_y, quart_z)
                    );
                }
            }
        }
    }
}
