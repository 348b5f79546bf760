//! Failures of a chunk generation attempt.

use steel_density::DensityError;
use thiserror::Error;

use crate::chunk::{ChunkPos, ChunkStatus};

/// Why a chunk failed to generate.
///
/// A failure is final for that chunk's load attempt; nothing in here is
/// retried. Shared seed state is only ever appended to, so it stays usable.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A stage was requested before its predecessor completed.
    #[error("chunk {pos:?} cannot run {requested:?} while at {current:?}")]
    StageOrder {
        /// The chunk.
        pos: ChunkPos,
        /// The status the chunk was at.
        current: ChunkStatus,
        /// The stage that was requested.
        requested: ChunkStatus,
    },
    /// Settings or seed binding failed.
    #[error(transparent)]
    Density(#[from] DensityError),
    /// A generation task panicked or was aborted.
    #[error("generation task for chunk {pos:?} failed: {reason}")]
    Join {
        /// The chunk.
        pos: ChunkPos,
        /// Panic or cancellation message.
        reason: String,
    },
}
