//! Fluid placement where the terrain density is not solid.
//!
//! Only the sea-level aquifer is implemented: below sea level every open
//! block is the default fluid, and deep down it turns to lava. Noise-based
//! aquifers with their own fluid pockets belong to a later pass.

use steel_density::BlockStateId;
use steel_density::block::blocks;
use steel_density::density::FunctionContext;

/// Y below which the global fluid picker returns lava.
pub const LAVA_LEVEL: i32 = -54;

/// A fluid surface: blocks below `fluid_level` are `fluid_type`, above is air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidStatus {
    /// First Y above the fluid.
    pub fluid_level: i32,
    /// The fluid block.
    pub fluid_type: BlockStateId,
}

impl FluidStatus {
    /// Creates a fluid status.
    #[must_use]
    pub const fn new(fluid_level: i32, fluid_type: BlockStateId) -> Self {
        Self { fluid_level, fluid_type }
    }

    /// The open-space block at `y`.
    #[must_use]
    pub const fn at(&self, y: i32) -> BlockStateId {
        if y < self.fluid_level {
            self.fluid_type
        } else {
            blocks::AIR
        }
    }
}

/// Fluid level lookup by position.
pub trait FluidPicker: Send + Sync {
    /// The fluid surface governing `(x, y, z)`.
    fn compute_fluid(&self, x: i32, y: i32, z: i32) -> FluidStatus;
}

/// Lava below `min(LAVA_LEVEL, sea_level)`, the default fluid up to sea level elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalFluidPicker {
    lava: FluidStatus,
    sea: FluidStatus,
    lava_below: i32,
}

impl GlobalFluidPicker {
    /// Creates the picker for a dimension.
    #[must_use]
    pub fn new(sea_level: i32, default_fluid: BlockStateId) -> Self {
        Self {
            lava: FluidStatus::new(LAVA_LEVEL, blocks::LAVA),
            sea: FluidStatus::new(sea_level, default_fluid),
            lava_below: LAVA_LEVEL.min(sea_level),
        }
    }
}

impl FluidPicker for GlobalFluidPicker {
    fn compute_fluid(&self, _x: i32, y: i32, _z: i32) -> FluidStatus {
        if y < self.lava_below { self.lava } else { self.sea }
    }
}

/// Fills every non-solid position from a [`FluidPicker`].
pub struct SeaLevelAquifer<P = GlobalFluidPicker> {
    picker: P,
}

impl<P: FluidPicker> SeaLevelAquifer<P> {
    /// Creates the aquifer.
    pub const fn new(picker: P) -> Self {
        Self { picker }
    }

    /// The block for a position with the given final density, or `None` if
    /// the position is solid and another rule decides.
    pub fn compute_substance(&self, ctx: &FunctionContext, density: f64) -> Option<BlockStateId> {
        if density > 0.0 {
            None
        } else {
            Some(
                self.picker
                    .compute_fluid(ctx.block_x, ctx.block_y, ctx.block_z)
                    .at(ctx.block_y),
            )
        }
    }
}
