//! The block states terrain generation can place.
//!
//! Only the handful of states the noise stage writes are known here. Surface
//! rules and features that place the rest of the palette live outside this
//! crate and pass their own ids through.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A block state id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockStateId(pub u16);

/// Fluid carried by a block state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fluid {
    /// Water.
    Water,
    /// Lava.
    Lava,
}

struct BlockInfo {
    name: &'static str,
    light_emission: u8,
    fluid: Option<Fluid>,
}

const fn info(name: &'static str) -> BlockInfo {
    BlockInfo {
        name,
        light_emission: 0,
        fluid: None,
    }
}

const BLOCKS: [BlockInfo; 13] = [
    info("air"),
    info("stone"),
    BlockInfo {
        name: "water",
        light_emission: 0,
        fluid: Some(Fluid::Water),
    },
    BlockInfo {
        name: "lava",
        light_emission: 15,
        fluid: Some(Fluid::Lava),
    },
    info("deepslate"),
    info("copper_ore"),
    info("deepslate_copper_ore"),
    info("raw_copper_block"),
    info("granite"),
    info("iron_ore"),
    info("deepslate_iron_ore"),
    info("raw_iron_block"),
    info("tuff"),
];

/// Ids of the known block states.
pub mod blocks {
    use super::BlockStateId;

    /// Air.
    pub const AIR: BlockStateId = BlockStateId(0);
    /// Stone.
    pub const STONE: BlockStateId = BlockStateId(1);
    /// Water source.
    pub const WATER: BlockStateId = BlockStateId(2);
    /// Lava source.
    pub const LAVA: BlockStateId = BlockStateId(3);
    /// Deepslate.
    pub const DEEPSLATE: BlockStateId = BlockStateId(4);
    /// Copper ore.
    pub const COPPER_ORE: BlockStateId = BlockStateId(5);
    /// Deepslate copper ore.
    pub const DEEPSLATE_COPPER_ORE: BlockStateId = BlockStateId(6);
    /// Raw copper block.
    pub const RAW_COPPER_BLOCK: BlockStateId = BlockStateId(7);
    /// Granite.
    pub const GRANITE: BlockStateId = BlockStateId(8);
    /// Iron ore.
    pub const IRON_ORE: BlockStateId = BlockStateId(9);
    /// Deepslate iron ore.
    pub const DEEPSLATE_IRON_ORE: BlockStateId = BlockStateId(10);
    /// Raw iron block.
    pub const RAW_IRON_BLOCK: BlockStateId = BlockStateId(11);
    /// Tuff.
    pub const TUFF: BlockStateId = BlockStateId(12);
}

impl BlockStateId {
    fn info(self) -> Option<&'static BlockInfo> {
        BLOCKS.get(usize::from(self.0))
    }

    /// Registry name without namespace, `None` for ids placed by other stages.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        self.info().map(|info| info.name)
    }

    /// Looks up a known state by name, with or without the `minecraft:` prefix.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("minecraft:").unwrap_or(name);
        BLOCKS
            .iter()
            .position(|info| info.name == name)
            .map(|index| Self(index as u16))
    }

    /// Whether this is air.
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.0 == blocks::AIR.0
    }

    /// Light level emitted by the state.
    #[must_use]
    pub fn light_emission(self) -> u8 {
        self.info().map_or(0, |info| info.light_emission)
    }

    /// The fluid contained in the state.
    #[must_use]
    pub fn fluid(self) -> Option<Fluid> {
        self.info().and_then(|info| info.fluid)
    }

    /// Whether entities collide with the state. Fluids and air don't.
    #[must_use]
    pub fn blocks_motion(self) -> bool {
        !self.is_air() && self.fluid().is_none()
    }
}

impl fmt::Debug for BlockStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "BlockStateId({}: {name})", self.0),
            None => write!(f, "BlockStateId({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(BlockStateId::from_name("minecraft:stone"), Some(blocks::STONE));
        assert_eq!(BlockStateId::from_name("tuff"), Some(blocks::TUFF));
        assert_eq!(BlockStateId::from_name("minecraft:dirt"), None);
    }

    #[test]
    fn test_properties() {
        assert_eq!(blocks::LAVA.light_emission(), 15);
        assert_eq!(blocks::WATER.fluid(), Some(Fluid::Water));
        assert!(!blocks::WATER.blocks_motion());
        assert!(blocks::STONE.blocks_motion());
        assert!(!blocks::AIR.blocks_motion());
    }
}
