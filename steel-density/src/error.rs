//! Construction-time failures of routers, noises and seed binding.

use thiserror::Error;

/// An unrecoverable configuration error.
///
/// These abort [`crate::RandomState::create`]; they never occur while sampling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DensityError {
    /// A router bundle lacks one of the fixed root names.
    #[error("noise router is missing required root `{0}`")]
    MissingRoot(&'static str),
    /// A root or node input points outside the DAG.
    #[error("density node {index} referenced but the DAG has {len} nodes")]
    DanglingReference {
        /// The offending index.
        index: usize,
        /// Number of nodes in the DAG.
        len: usize,
    },
    /// A noise node names parameters that are not registered.
    #[error("unknown noise parameters `{0}`")]
    UnknownNoise(String),
    /// Legacy octave construction could not honor the amplitudes.
    #[error("invalid noise parameters: {0}")]
    InvalidNoiseParameters(&'static str),
    /// Noise shape settings outside the supported build limits.
    #[error("invalid noise settings: {0}")]
    InvalidSettings(String),
}
