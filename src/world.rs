//! The trait boundary between the quarry core and the block/world storage
//! substrate it operates in.
//!
//! The core never performs registry lookups or stores terrain itself; it
//! receives already-resolved capability values (hardness-derived break cost,
//! fluid viscosity, passability) as plain data through [`World`], and issues
//! mutations back through the same trait. Chunk keep-alive and achievement
//! notification are one-way signals and are not part of this trait; see
//! [`Quarry::chunks_to_load()`](crate::quarry::Quarry::chunks_to_load) and
//! [`StepOutcome`](crate::quarry::StepOutcome).

use crate::math::{Aab, Cube, GridCoordinate};
use crate::power::Power;

/// Fluids at or below this viscosity do not obstruct the drill.
pub const MAX_PASSABLE_VISCOSITY: i32 = 1000;

/// Access to the world the quarry operates in, as seen by the quarry core.
///
/// All methods are synchronous and bounded; they are called only from within a
/// controller step or a reentrant change notification, never concurrently.
pub trait World {
    /// Whether the cell contains nothing at all (not even fluid).
    fn is_air(&self, cube: Cube) -> bool;

    /// Viscosity of the fluid occupying the cell, if any. Flowing and still
    /// fluid both count.
    fn fluid_viscosity(&self, cube: Cube) -> Option<i32>;

    /// The energy required to break the block in the cell, derived from its
    /// hardness at this moment. Returns [`None`] if the block is unbreakable
    /// (negative hardness). The cost must be computed live: the block can change
    /// between task scheduling and completion.
    fn break_cost(&self, cube: Cube) -> Option<Power>;

    /// Places a frame block in the cell. Callers check emptiness first; placing
    /// into an occupied cell is the implementation's problem to reject.
    fn place_frame(&mut self, cube: Cube);

    /// Whether the cell currently holds a frame block.
    fn is_frame(&self, cube: Cube) -> bool;

    /// Removes the block in the cell. If `drop_contents` is true the block's
    /// drops are spawned as items; otherwise it is destroyed outright.
    fn destroy_block(&mut self, cube: Cube, drop_contents: bool);

    /// Raises the cancelable about-to-remove-block notification. Returns
    /// `false` if an external listener vetoed the removal.
    fn break_permitted(&mut self, cube: Cube) -> bool;

    /// Publishes visual break progress for the cell: `Some(stage)` with stage in
    /// `0..=9`, or [`None`] to clear the cracks.
    fn set_break_progress(&mut self, cube: Cube, stage: Option<u8>);

    /// Sweeps any dropped items within `region` into the best available
    /// external inventory acceptor.
    fn sweep_drops(&mut self, region: Aab);

    /// Whether the drill can occupy or pass through the cell: air, or fluid
    /// thin enough to push through.
    #[inline]
    fn passable(&self, cube: Cube) -> bool {
        self.is_air(cube)
            || self
                .fluid_viscosity(cube)
                .is_some_and(|v| v <= MAX_PASSABLE_VISCOSITY)
    }

    /// Whether the cell is currently eligible to be broken: breakable hardness,
    /// and no fluid too viscous to work in.
    #[inline]
    fn minable(&self, cube: Cube) -> bool {
        self.break_cost(cube).is_some()
            && self
                .fluid_viscosity(cube)
                .is_none_or(|v| v <= MAX_PASSABLE_VISCOSITY)
    }
}

/// Identifies a 16×16-cell column of the world, for chunk keep-alive
/// bookkeeping.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(missing_docs)]
pub struct ChunkPos {
    pub x: GridCoordinate,
    pub z: GridCoordinate,
}

impl ChunkPos {
    /// The chunk containing the given cell.
    #[inline]
    pub fn containing(cube: Cube) -> Self {
        Self {
            x: cube.x >> 4,
            z: cube.z >> 4,
        }
    }
}

/// An in-memory [`World`] for tests: a sparse map of cells plus a record of the
/// mutations and signals the quarry issued.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use hashbrown::{HashMap, HashSet};

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub(crate) enum TestBlock {
        Frame,
        Stone { cost: Power },
        Unbreakable,
        Fluid { viscosity: i32 },
    }

    #[derive(Default)]
    pub(crate) struct TestWorld {
        blocks: HashMap<Cube, TestBlock>,
        /// Cells whose removal an external listener vetoes.
        pub(crate) veto: HashSet<Cube>,
        /// Latest published break-progress stage per cell.
        pub(crate) progress: HashMap<Cube, u8>,
        /// Every `destroy_block` call, in order.
        pub(crate) destroyed: Vec<(Cube, bool)>,
        /// Every `sweep_drops` call, in order.
        pub(crate) swept: Vec<Aab>,
    }

    impl TestWorld {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn set(&mut self, cube: Cube, block: TestBlock) {
            self.blocks.insert(cube, block);
        }

        pub(crate) fn clear(&mut self, cube: Cube) {
            self.blocks.remove(&cube);
        }

        /// Fills the whole volume with breakable stone of uniform cost.
        pub(crate) fn fill_stone(&mut self, volume: crate::math::Volume, cost: Power) {
            for cube in volume.cells() {
                self.set(cube, TestBlock::Stone { cost });
            }
        }
    }

    impl World for TestWorld {
        fn is_air(&self, cube: Cube) -> bool {
            !self.blocks.contains_key(&cube)
        }

        fn fluid_viscosity(&self, cube: Cube) -> Option<i32> {
            match self.blocks.get(&cube) {
                Some(&TestBlock::Fluid { viscosity }) => Some(viscosity),
                _ => None,
            }
        }

        fn break_cost(&self, cube: Cube) -> Option<Power> {
            match self.blocks.get(&cube) {
                Some(&TestBlock::Stone { cost }) => Some(cost),
                Some(TestBlock::Frame) => Some(crate::power::UNIT),
                Some(TestBlock::Unbreakable) | Some(TestBlock::Fluid { .. }) | None => None,
            }
        }

        fn place_frame(&mut self, cube: Cube) {
            assert!(self.is_air(cube), "place_frame into occupied cell {cube:?}");
            self.blocks.insert(cube, TestBlock::Frame);
        }

        fn is_frame(&self, cube: Cube) -> bool {
            self.blocks.get(&cube) == Some(&TestBlock::Frame)
        }

        fn destroy_block(&mut self, cube: Cube, drop_contents: bool) {
            self.blocks.remove(&cube);
            self.destroyed.push((cube, drop_contents));
        }

        fn break_permitted(&mut self, cube: Cube) -> bool {
            !self.veto.contains(&cube)
        }

        fn set_break_progress(&mut self, cube: Cube, stage: Option<u8>) {
            match stage {
                Some(stage) => {
                    self.progress.insert(cube, stage);
                }
                None => {
                    self.progress.remove(&cube);
                }
            }
        }

        fn sweep_drops(&mut self, region: Aab) {
            self.swept.push(region);
        }
    }
}
