//! Seeded density functions for voxel terrain generation.
//!
//! A dimension's terrain is described by a [`NoiseRouter`]: fifteen named roots
//! into one shared DAG of density functions. Templates are seed independent;
//! [`RandomState::create`] binds a template to a world seed once, after which
//! any number of chunks can evaluate it concurrently.
//!
//! # Key Types
//!
//! - [`density::DensityDag`] - the node arena with builders and the pure evaluator
//! - [`density::chunk::ChunkRouter`] - per-chunk stack that realizes the cache markers
//! - [`NoiseRouter`] - the fixed roots chunk generation reads
//! - [`RandomState`] - a router bound to one seed, plus its positional streams
//! - [`NoiseGeneratorSettings`] - noise shape, default blocks and router template

pub mod block;
pub mod density;
pub mod error;
pub mod math;
pub mod noise;
pub mod presets;
pub mod random;
pub mod random_state;
pub mod router;
pub mod settings;

pub use block::{BlockStateId, Fluid};
pub use error::DensityError;
pub use random_state::RandomState;
pub use router::{NoiseRouter, ROOT_NAMES};
pub use settings::{NoiseGeneratorSettings, NoiseSettings};
