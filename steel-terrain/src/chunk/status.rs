//! The ordered stages a proto chunk goes through.

/// How far a proto chunk has been generated.
///
/// Stages run strictly in declaration order; a chunk may only advance to
/// the status directly after its current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChunkStatus {
    /// Freshly allocated, all air.
    Empty,
    /// Biomes assigned.
    Biomes,
    /// Surface rules applied.
    Surface,
    /// Carvers applied.
    Carvers,
    /// Terrain filled from noise.
    Noise,
}

impl ChunkStatus {
    /// The stages that follow [`ChunkStatus::Empty`], in order.
    pub const STAGES: [Self; 4] = [Self::Biomes, Self::Surface, Self::Carvers, Self::Noise];

    /// The status a chunk must be at before this stage may run.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Empty => None,
            Self::Biomes => Some(Self::Empty),
            Self::Surface => Some(Self::Biomes),
            Self::Carvers => Some(Self::Surface),
            Self::Noise => Some(Self::Carvers),
        }
    }

    /// The next stage.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Empty => Some(Self::Biomes),
            Self::Biomes => Some(Self::Surface),
            Self::Surface => Some(Self::Carvers),
            Self::Carvers => Some(Self::Noise),
            Self::Noise => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Biomes => "biomes",
            Self::Surface => "surface",
            Self::Carvers => "carvers",
            Self::Noise => "noise",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_and_next_agree() {
        for stage in ChunkStatus::STAGES {
            let parent = stage.parent().unwrap();
            assert_eq!(parent.next(), Some(stage));
            assert!(parent < stage);
        }
        assert_eq!(ChunkStatus::Empty.parent(), None);
        assert_eq!(ChunkStatus::Noise.next(), None);
    }
}
