//! Replication of the render-relevant subset of a quarry's state to observers.
//!
//! The channel is one-directional, periodic, and lossy: the authoritative side
//! emits a [`Snapshot`] whenever [`StepOutcome::render_changed`] says so (and on
//! whatever resend schedule the transport likes), and the latest snapshot always
//! supersedes an older one. No delta encoding, no acknowledgements.
//!
//! [`Observer`] is the receiving side. It has no authority over the machine; it
//! keeps a two-sample interpolation buffer over the drill position and the
//! active task's progress so that rendering between snapshots stays smooth. The
//! one subtlety is re-broadcast: an incoming task that is structurally the same
//! work as the one already held must not reset the buffer (see
//! [`Task::same_work()`]), or the drill would visibly stutter on every resend.
//!
//! [`StepOutcome::render_changed`]: crate::quarry::StepOutcome

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::math::{FreeCoordinate, FreePoint, Volume};
use crate::power::Power;
use crate::quarry::Quarry;
use crate::save::conversion;
use crate::save::schema;
use crate::task::Task;

/// The render-relevant subset of a quarry's state, as broadcast to observers.
///
/// Serializes in the same versioned style as the durable layout, sharing the
/// task and volume encodings with it.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// The frame volume (possibly uninitialized).
    pub frame: Volume,
    /// The mining volume (possibly uninitialized).
    pub mining: Volume,
    /// The drill position, if deployed.
    pub drill_pos: Option<FreePoint>,
    /// The active task, including its accumulated power.
    pub task: Option<Task>,
}

impl Snapshot {
    /// Captures the current render-relevant state of `quarry`.
    pub fn capture(quarry: &Quarry) -> Self {
        Self {
            frame: quarry.frame_volume(),
            mining: quarry.mining_volume(),
            drill_pos: quarry.drill_pos(),
            task: quarry.current_task().cloned(),
        }
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        schema::SnapshotSer::SnapshotV1 {
            frame: conversion::volume_to_schema(self.frame),
            mining: conversion::volume_to_schema(self.mining),
            drill_pos: self.drill_pos.map(<[f64; 3]>::from),
            task: self.task.as_ref().map(conversion::task_to_schema),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let schema::SnapshotSer::SnapshotV1 {
            frame,
            mining,
            drill_pos,
            task,
        } = schema::SnapshotSer::deserialize(deserializer)?;
        Ok(Self {
            frame: conversion::volume_from_schema::<D::Error>(frame)?,
            mining: conversion::volume_from_schema::<D::Error>(mining)?,
            drill_pos: drill_pos.and_then(conversion::point_from_array),
            task: task.and_then(conversion::task_from_schema),
        })
    }
}

/// Observer-side (client) state of one quarry: the latest authoritative
/// snapshot plus two-sample interpolation buffers for smooth rendering.
///
/// Drive it by calling [`apply()`](Self::apply) for each snapshot that arrives
/// and [`client_step()`](Self::client_step) once per rendered simulation step;
/// the interpolation accessors blend between the two most recent steps.
#[derive(Clone, Debug)]
pub struct Observer {
    frame: Volume,
    mining: Volume,
    /// Latest authoritative value; feeds the buffer on the next step.
    drill_pos: Option<FreePoint>,
    task: Option<Task>,

    prev_drill_pos: Option<FreePoint>,
    current_drill_pos: Option<FreePoint>,
    prev_power: Power,
    current_power: Power,
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer {
    pub fn new() -> Self {
        Self {
            frame: Volume::UNINITIALIZED,
            mining: Volume::UNINITIALIZED,
            drill_pos: None,
            task: None,
            prev_drill_pos: None,
            current_drill_pos: None,
            prev_power: 0,
            current_power: 0,
        }
    }

    /// The frame volume as last broadcast.
    pub fn frame_volume(&self) -> Volume {
        self.frame
    }

    /// The mining volume as last broadcast.
    pub fn mining_volume(&self) -> Volume {
        self.mining
    }

    /// The active task as last broadcast.
    pub fn current_task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// Replaces this observer's state with an incoming snapshot.
    ///
    /// A task structurally equal to the held one (a re-broadcast) only updates
    /// the held task's progress, leaving the interpolation buffers alone; a
    /// semantically new task resets them.
    pub fn apply(&mut self, snapshot: Snapshot) {
        self.frame = snapshot.frame;
        self.mining = snapshot.mining;
        self.drill_pos = snapshot.drill_pos;
        match (&mut self.task, snapshot.task) {
            (Some(held), Some(incoming)) if held.same_work(&incoming) => {
                held.set_power(incoming.power());
            }
            (slot, incoming) => {
                let power = incoming.as_ref().map_or(0, Task::power);
                *slot = incoming;
                self.prev_power = power;
                self.current_power = power;
            }
        }
    }

    /// Advances the interpolation buffers by one rendered step:
    /// `previous ← current; current ← authoritative`.
    pub fn client_step(&mut self) {
        self.prev_drill_pos = self.current_drill_pos;
        self.current_drill_pos = self.drill_pos;
        self.prev_power = self.current_power;
        self.current_power = self.task.as_ref().map_or(0, Task::power);
    }

    /// The drill position blended between the two most recent steps, for a
    /// partial-step fraction `t` in `0.0..=1.0`.
    pub fn interpolated_drill_pos(&self, t: FreeCoordinate) -> Option<FreePoint> {
        let current = self.current_drill_pos?;
        match self.prev_drill_pos {
            Some(prev) => Some(prev.lerp(current, t)),
            // First sample after deployment; nothing to blend from.
            None => Some(current),
        }
    }

    /// The active task's progress blended between the two most recent steps.
    pub fn interpolated_power(&self, t: FreeCoordinate) -> FreeCoordinate {
        let prev = self.prev_power as FreeCoordinate;
        let current = self.current_power as FreeCoordinate;
        prev + (current - prev) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Cube, Face};
    use crate::power::UNIT;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot_with_task(task: Task) -> Snapshot {
        Snapshot {
            frame: Volume::from_min_max([0, 0, 0], [4, 4, 4]),
            mining: Volume::from_min_max([1, 0, 1], [3, 3, 3]),
            drill_pos: Some(FreePoint::new(2.0, 3.0, 2.0)),
            task: Some(task),
        }
    }

    #[test]
    fn capture_reflects_quarry_state() {
        let mut quarry = Quarry::new(Cube::new(-1, 0, 2), Face::PX);
        quarry.configure([0, 0, 0], [4, 4, 4], 0);
        let snapshot = Snapshot::capture(&quarry);
        assert_eq!(snapshot.frame, quarry.frame_volume());
        assert_eq!(snapshot.mining, quarry.mining_volume());
        assert_eq!(snapshot.drill_pos, None);
        assert!(snapshot.task.is_none());
    }

    #[test]
    fn wire_round_trip() {
        let mut task = Task::break_block(Cube::new(3, 3, 2), true);
        task.set_power(7 * UNIT);
        let snapshot = snapshot_with_task(task);

        let json = serde_json::to_value(&snapshot).unwrap();
        let decoded: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.frame, snapshot.frame);
        assert_eq!(decoded.mining, snapshot.mining);
        assert_eq!(decoded.drill_pos, snapshot.drill_pos);
        let decoded_task = decoded.task.unwrap();
        assert!(decoded_task.same_work(snapshot.task.as_ref().unwrap()));
        assert_eq!(decoded_task.power(), 7 * UNIT);
    }

    #[test]
    fn unknown_snapshot_tag_fails_to_decode() {
        let json = json!({ "type": "SnapshotV9" });
        serde_json::from_value::<Snapshot>(json).unwrap_err();
    }

    #[test]
    fn rebroadcast_of_same_task_preserves_interpolation() {
        let mut observer = Observer::new();
        let mut task = Task::break_block(Cube::new(3, 3, 2), true);
        task.set_power(2 * UNIT);
        observer.apply(snapshot_with_task(task.clone()));
        observer.client_step();
        observer.client_step();
        assert_eq!(observer.interpolated_power(0.0), 2.0 * UNIT as f64);

        // Same work, more progress: the buffer keeps its previous sample.
        task.set_power(4 * UNIT);
        observer.apply(snapshot_with_task(task));
        observer.client_step();
        assert_eq!(observer.interpolated_power(0.0), 2.0 * UNIT as f64);
        assert_eq!(observer.interpolated_power(1.0), 4.0 * UNIT as f64);
        assert_eq!(observer.interpolated_power(0.5), 3.0 * UNIT as f64);
    }

    #[test]
    fn new_task_resets_interpolation() {
        let mut observer = Observer::new();
        let mut first = Task::break_block(Cube::new(3, 3, 2), true);
        first.set_power(8 * UNIT);
        observer.apply(snapshot_with_task(first));
        observer.client_step();
        observer.client_step();

        let mut second = Task::break_block(Cube::new(2, 3, 2), true);
        second.set_power(UNIT);
        observer.apply(snapshot_with_task(second));
        // Buffers snap to the new task's progress immediately; no blend from
        // the finished task's value.
        assert_eq!(observer.interpolated_power(0.0), UNIT as f64);
        assert_eq!(observer.interpolated_power(1.0), UNIT as f64);
    }

    #[test]
    fn drill_pos_interpolates_between_steps() {
        let mut observer = Observer::new();
        let mut snapshot = snapshot_with_task(Task::break_block(Cube::new(3, 3, 2), true));
        snapshot.drill_pos = Some(FreePoint::new(0.0, 8.0, 0.0));
        observer.apply(snapshot.clone());
        observer.client_step();
        // First sample: nothing to blend from yet.
        assert_eq!(
            observer.interpolated_drill_pos(0.5),
            Some(FreePoint::new(0.0, 8.0, 0.0))
        );

        snapshot.drill_pos = Some(FreePoint::new(2.0, 8.0, 0.0));
        observer.apply(snapshot);
        observer.client_step();
        assert_eq!(
            observer.interpolated_drill_pos(0.0),
            Some(FreePoint::new(0.0, 8.0, 0.0))
        );
        assert_eq!(
            observer.interpolated_drill_pos(0.5),
            Some(FreePoint::new(1.0, 8.0, 0.0))
        );
        assert_eq!(
            observer.interpolated_drill_pos(1.0),
            Some(FreePoint::new(2.0, 8.0, 0.0))
        );
    }

    #[test]
    fn no_drill_pos_until_broadcast() {
        let mut observer = Observer::new();
        assert_eq!(observer.interpolated_drill_pos(0.5), None);
        let mut snapshot = snapshot_with_task(Task::place_frame(Cube::new(0, 0, 0)));
        snapshot.drill_pos = None;
        observer.apply(snapshot);
        observer.client_step();
        assert_eq!(observer.interpolated_drill_pos(0.5), None);
    }
}
