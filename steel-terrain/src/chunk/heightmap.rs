//! World-generation heightmaps.

use steel_density::BlockStateId;

/// Which blocks a heightmap tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeightmapType {
    /// Highest non-air block.
    WorldSurfaceWg,
    /// Highest block that blocks motion, so fluids don't count.
    OceanFloorWg,
}

impl HeightmapType {
    /// Both generation heightmaps.
    pub const ALL: [Self; 2] = [Self::WorldSurfaceWg, Self::OceanFloorWg];

    /// Whether `state` counts as a surface for this heightmap.
    #[must_use]
    pub fn is_opaque(self, state: BlockStateId) -> bool {
        match self {
            Self::WorldSurfaceWg => !state.is_air(),
            Self::OceanFloorWg => state.blocks_motion(),
        }
    }
}

/// The first free Y above the tracked surface, per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heightmap {
    kind: HeightmapType,
    min_y: i32,
    data: Box<[i32]>,
}

impl Heightmap {
    /// A heightmap where every column is empty.
    #[must_use]
    pub fn new(kind: HeightmapType, min_y: i32) -> Self {
        Self {
            kind,
            min_y,
            data: vec![min_y; 256].into_boxed_slice(),
        }
    }

    #[inline]
    const fn index(x: usize, z: usize) -> usize {
        x + z * 16
    }

    /// The tracked type.
    #[must_use]
    pub const fn kind(&self) -> HeightmapType {
        self.kind
    }

    /// First Y above the surface of column `(x, z)`; the chunk's min Y when
    /// the column is empty.
    #[must_use]
    pub fn first_available(&self, x: usize, z: usize) -> i32 {
        self.data[Self::index(x, z)]
    }

    /// Records `state` placed at `(x, y, z)`. Returns whether the height changed.
    ///
    /// Only raises the surface: the noise stage writes into air, so a placed
    /// block never uncovers one below it.
    pub fn update(&mut self, x: usize, y: i32, z: usize, state: BlockStateId) -> bool {
        let first_available = self.first_available(x, z);
        if y < first_available || !self.kind.is_opaque(state) {
            return false;
        }
        self.data[Self::index(x, z)] = y + 1;
        true
    }

    /// Whether no column has a surface.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&height| height == self.min_y)
    }
}

#[cfg(test)]
mod tests {
    use steel_density::block::blocks;

    use super::*;

    #[test]
    fn test_update_raises_only() {
        let mut map = Heightmap::new(HeightmapType::WorldSurfaceWg, -64);
        assert!(map.is_empty());
        assert!(map.update(3, 10, 4, blocks::STONE));
        assert!(!map.update(3, 5, 4, blocks::STONE));
        assert!(!map.update(3, 20, 4, blocks::AIR));
        assert_eq!(map.first_available(3, 4), 11);
        assert_eq!(map.first_available(4, 3), -64);
    }

    #[test]
    fn test_ocean_floor_ignores_fluids() {
        let mut floor = Heightmap::new(HeightmapType::OceanFloorWg, 0);
        let mut surface = Heightmap::new(HeightmapType::WorldSurfaceWg, 0);
        for (y, state) in [(40, blocks::STONE), (62, blocks::WATER)] {
            floor.update(0, y, 0, state);
            surface.update(0, y, 0, state);
        }
        assert_eq!(floor.first_available(0, 0), 41);
        assert_eq!(surface.first_available(0, 0), 63);
    }
}
