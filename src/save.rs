//! Serialization/persistence of a quarry's complete authoritative state.
//!
//! The durable layout round-trips exactly: reloading resumes mid-task with
//! identical accumulated power. Decoding is fail-safe: a task whose positions
//! fail validation is dropped entirely (fail to “no task”, not to a crash),
//! and a cursor whose originating volume no longer matches the mining volume
//! is discarded.

pub(crate) mod conversion;
pub(crate) mod schema;


use crate::math::{Cube, FreePoint, Volume};
use crate::power::Power;
use crate::quarry::Quarry;
use crate::task::Task;

/// The durable record of everything a [`Quarry`] needs to resume.
///
/// Obtain one with [`Quarry::to_saved()`]; it serializes with [`serde`].
/// This is a snapshot, not a live view.
#[derive(Clone, Debug)]
pub struct SavedQuarry {
    /// The frame volume (possibly uninitialized).
    pub frame: Volume,
    /// The mining volume (possibly uninitialized).
    pub mining: Volume,
    /// The scan cursor: its originating volume and current cell.
    pub cursor: Option<(Volume, Cube)>,
    /// Reservoir capacity.
    pub capacity: Power,
    /// Reservoir contents; clamped to capacity on restore.
    pub stored: Power,
    /// The active task, mid-progress.
    pub task: Option<Task>,
    /// The drill position, if deployed.
    pub drill_pos: Option<FreePoint>,
    /// Whether the initial frame validation pass had completed.
    pub first_checked: bool,
}

impl Quarry {
    /// Captures this quarry's durable state.
    pub fn to_saved(&self) -> SavedQuarry {
        self.state_for_save()
    }

    /// Reconstructs a quarry from its durable state.
    ///
    /// The station cell and mounted side are properties of the machine's
    /// placement in the world, not of its saved state, so the caller supplies
    /// them; the unserialized work lists and frame chain are rebuilt from the
    /// volumes.
    pub fn restore(station: Cube, frame_side: crate::math::Face, saved: SavedQuarry) -> Quarry {
        let mut quarry = Quarry::new(station, frame_side);
        quarry.apply_saved(saved);
        quarry
    }
}
