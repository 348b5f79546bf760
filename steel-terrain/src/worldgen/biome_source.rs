//! Biome sources: which biome sits at each quart position.
//!
//! Mirrors vanilla's `FixedBiomeSource` and `MultiNoiseBiomeSource`. Biomes
//! are plain ids into [`BIOME_NAMES`]; the multi-noise source matches the
//! climate against a parameter list with a brute-force nearest search.

use crate::worldgen::climate::{ClimateSampler, Parameter, ParameterPoint, TargetPoint};

/// Names of the biome ids used by the built-in sources.
pub const BIOME_NAMES: [&str; 10] = [
    "plains",
    "ocean",
    "deep_ocean",
    "beach",
    "desert",
    "forest",
    "snowy_plains",
    "jungle",
    "stony_peaks",
    "river",
];

/// Ids of the built-in biomes.
pub mod biomes {
    /// Plains.
    pub const PLAINS: u16 = 0;
    /// Ocean.
    pub const OCEAN: u16 = 1;
    /// Deep ocean.
    pub const DEEP_OCEAN: u16 = 2;
    /// Beach.
    pub const BEACH: u16 = 3;
    /// Desert.
    pub const DESERT: u16 = 4;
    /// Forest.
    pub const FOREST: u16 = 5;
    /// Snowy plains.
    pub const SNOWY_PLAINS: u16 = 6;
    /// Jungle.
    pub const JUNGLE: u16 = 7;
    /// Stony peaks.
    pub const STONY_PEAKS: u16 = 8;
    /// River.
    pub const RIVER: u16 = 9;
}

/// Name of a biome id.
#[must_use]
pub fn biome_name(id: u16) -> Option<&'static str> {
    BIOME_NAMES.get(usize::from(id)).copied()
}

/// A biome chosen by climate.
pub struct MultiNoiseBiomeSource {
    entries: Box<[(ParameterPoint, u16)]>,
}

impl MultiNoiseBiomeSource {
    /// A source over `entries`. Earlier entries win ties.
    #[must_use]
    pub fn new(entries: Vec<(ParameterPoint, u16)>) -> Self {
        Self {
            entries: entries.into_boxed_slice(),
        }
    }

    /// The biome whose parameters are closest to `target`.
    ///
    /// `last` holds the index of the previous match and seeds the search. It
    /// is kept when another entry only ties it.
    #[must_use]
    pub fn find(&self, target: &TargetPoint, last: &mut Option<usize>) -> u16 {
        let mut best = last.filter(|&index| index < self.entries.len()).unwrap_or(0);
        let Some((point, _)) = self.entries.get(best) else {
            return 0;
        };
        let mut best_fitness = point.fitness(target);
        for (index, (point, _)) in self.entries.iter().enumerate() {
            let fitness = point.fitness(target);
            if fitness < best_fitness {
                best = index;
                best_fitness = fitness;
            }
        }
        *last = Some(best);
        self.entries[best].1
    }

    /// A small overworld table: oceans by continentalness, peaks by erosion,
    /// and land biomes by temperature and humidity.
    #[must_use]
    pub fn overworld() -> Self {
        let full = Parameter::span(-1.0, 1.0);
        let surface = Parameter::span(0.0, 0.0);
        let point = |temperature, humidity, continentalness, erosion| ParameterPoint {
            temperature,
            humidity,
            continentalness,
            erosion,
            depth: surface,
            weirdness: full,
            offset: 0,
        };
        let inland = Parameter::span(-0.11, 1.0);
        Self::new(vec![
            (point(full, full, Parameter::span(-1.05, -0.455), full), biomes::DEEP_OCEAN),
            (point(full, full, Parameter::span(-0.455, -0.19), full), biomes::OCEAN),
            (point(full, full, Parameter::span(-0.19, -0.11), full), biomes::BEACH),
            (
                point(full, full, Parameter::span(0.3, 1.0), Parameter::span(-1.0, -0.78)),
                biomes::STONY_PEAKS,
            ),
            (
                point(Parameter::span(-1.0, -0.45), full, inland, full),
                biomes::SNOWY_PLAINS,
            ),
            (
                point(Parameter::span(0.55, 1.0), Parameter::span(-1.0, 0.1), inland, full),
                biomes::DESERT,
            ),
            (
                point(Parameter::span(0.2, 1.0), Parameter::span(0.3, 1.0), inland, full),
                biomes::JUNGLE,
            ),
            (
                point(Parameter::span(-0.45, 0.55), Parameter::span(0.1, 1.0), inland, full),
                biomes::FOREST,
            ),
            (
                point(Parameter::span(-0.45, 0.55), Parameter::span(-1.0, 0.1), inland, full),
                biomes::PLAINS,
            ),
        ])
    }
}

/// Where biomes come from.
pub enum BiomeSource {
    /// One biome everywhere.
    Fixed(u16),
    /// Climate matching.
    MultiNoise(MultiNoiseBiomeSource),
}

impl BiomeSource {
    /// The biome at a quart position. `last` carries search state between
    /// neighbouring queries of one chunk.
    pub fn get_noise_biome(
        &self,
        quart_x: i32,
        quart_y: i32,
        quart_z: i32,
        sampler: &mut ClimateSampler<'_>,
        last: &mut Option<usize>,
    ) -> u16 {
        match self {
            Self::Fixed(biome) => *biome,
            Self::MultiNoise(source) => source.find(&sampler.sample(quart_x, quart_y, quart_z), last),
        }
    }
}
