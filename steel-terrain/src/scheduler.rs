//! Drives chunks through every generation stage.
//!
//! Stages of one chunk run strictly in order; different chunks run in
//! parallel. Async callers get one blocking task per stage, synchronous
//! callers can fan out over the rayon pool.

use std::sync::Arc;

use rayon::prelude::*;
use tokio::task::spawn_blocking;

use crate::chunk::{ChunkGenerator, ChunkPos, ChunkStatus, ProtoChunk, run_stage};
use crate::error::GenerationError;

/// Generates whole chunks with a shared [`ChunkGenerator`].
#[derive(Clone)]
pub struct WorldGenerator {
    generator: Arc<dyn ChunkGenerator>,
}

impl WorldGenerator {
    /// Wraps a chunk generator.
    #[must_use]
    pub fn new(generator: Arc<dyn ChunkGenerator>) -> Self {
        Self { generator }
    }

    /// The wrapped generator.
    #[must_use]
    pub fn generator(&self) -> &dyn ChunkGenerator {
        self.generator.as_ref()
    }

    /// An empty chunk sized to the generator's height range.
    #[must_use]
    pub fn new_chunk(&self, pos: ChunkPos) -> ProtoChunk {
        ProtoChunk::new(pos, self.generator.min_y(), self.generator.gen_depth())
    }

    /// Generates `pos` up to the noise stage, running each stage on the
    /// blocking pool.
    ///
    /// # Errors
    /// Returns the first stage failure, or [`GenerationError::Join`] if a
    /// stage task panicked.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn generate(&self, pos: ChunkPos) -> Result<Arc<ProtoChunk>, GenerationError> {
        let chunk = Arc::new(self.new_chunk(pos));
        for stage in ChunkStatus::STAGES {
            let generator = self.generator.clone();
            let target = chunk.clone();
            spawn_blocking(move || run_stage(generator.as_ref(), &target, stage))
                .await
                .map_err(|err| GenerationError::Join {
                    pos,
                    reason: err.to_string(),
                })??;
        }
        Ok(chunk)
    }

    /// Generates every position concurrently. Results keep the input order.
    pub async fn generate_many(&self, positions: &[ChunkPos]) -> Vec<Result<Arc<ProtoChunk>, GenerationError>> {
        let mut tasks = Vec::with_capacity(positions.len());
        for &pos in positions {
            let world = self.clone();
            tasks.push((pos, tokio::spawn(async move { world.generate(pos).await })));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (pos, task) in tasks {
            results.push(task.await.unwrap_or_else(|err| {
                Err(GenerationError::Join {
                    pos,
                    reason: err.to_string(),
                })
            }));
        }
        results
    }

    /// Generates `pos` on the calling thread.
    ///
    /// # Errors
    /// Returns the first stage failure.
    pub fn generate_blocking(&self, pos: ChunkPos) -> Result<ProtoChunk, GenerationError> {
        let chunk = self.new_chunk(pos);
        for stage in ChunkStatus::STAGES {
            run_stage(self.generator.as_ref(), &chunk, stage)?;
        }
        Ok(chunk)
    }

    /// Generates every position on the rayon pool. Results keep the input order.
    #[must_use]
    pub fn generate_batch(&self, positions: &[ChunkPos]) -> Vec<Result<ProtoChunk, GenerationError>> {
        positions
            .par_iter()
            .map(|&pos| self.generate_blocking(pos))
            .collect()
    }
}
