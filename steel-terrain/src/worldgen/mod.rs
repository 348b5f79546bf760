//! The per-chunk machinery behind the noise stage.

pub mod aquifer;
pub mod biome_source;
pub mod climate;
pub mod noise_chunk;
pub mod ore_veinifier;

pub use aquifer::{FluidPicker, FluidStatus, GlobalFluidPicker, SeaLevelAquifer};
pub use biome_source::{BiomeSource, MultiNoiseBiomeSource, biome_name};
pub use climate::{ClimateSampler, Parameter, ParameterPoint, TargetPoint};
pub use noise_chunk::NoiseChunk;
pub use ore_veinifier::OreVeinifier;
