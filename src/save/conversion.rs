//! Conversion between the types in [`super::schema`] and those used in normal
//! operation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::schema;
use crate::math::{Cube, FreePoint, Volume};
use crate::task::Task;

pub(crate) fn volume_to_schema(volume: Volume) -> schema::VolumeSer {
    schema::VolumeSer::VolumeV1 {
        bounds: match (volume.min(), volume.max()) {
            (Some(min), Some(max)) => Some(schema::BoundsSer {
                min: min.into(),
                max: max.into(),
            }),
            _ => None,
        },
    }
}

pub(crate) fn volume_from_schema<E: serde::de::Error>(
    value: schema::VolumeSer,
) -> Result<Volume, E> {
    let schema::VolumeSer::VolumeV1 { bounds } = value;
    match bounds {
        None => Ok(Volume::UNINITIALIZED),
        Some(schema::BoundsSer { min, max }) => Volume::checked_from_min_max(min, max)
            .map_err(|e| E::custom(format_args!("volume bounds: {e}"))),
    }
}

pub(crate) fn task_to_schema(task: &Task) -> schema::TaskSer {
    match *task {
        Task::BreakBlock(ref t) => schema::TaskSer::BreakBlockV1 {
            target: t.target.into(),
            excavation: t.excavation,
            power: t.power,
        },
        Task::PlaceFrame(ref t) => schema::TaskSer::PlaceFrameV1 {
            target: t.target.into(),
            power: t.power,
        },
        Task::MoveDrill(ref t) => schema::TaskSer::MoveDrillV1 {
            from: t.from.into(),
            to: t.to.into(),
            power: t.power,
        },
    }
}

/// Converts a serialized task back to a live one.
///
/// Returns [`None`], meaning “no task” rather than a partial resume, when a
/// position in the payload fails validation.
pub(crate) fn task_from_schema(value: schema::TaskSer) -> Option<Task> {
    let (mut task, power) = match value {
        schema::TaskSer::BreakBlockV1 {
            target,
            excavation,
            power,
        } => (Task::break_block(target.into(), excavation), power),
        schema::TaskSer::PlaceFrameV1 { target, power } => {
            (Task::place_frame(target.into()), power)
        }
        schema::TaskSer::MoveDrillV1 { from, to, power } => {
            if !(from.iter().all(|c| c.is_finite()) && to.iter().all(|c| c.is_finite())) {
                log::warn!("discarding saved move task with non-finite endpoints");
                return None;
            }
            (
                Task::move_drill(FreePoint::from(from), FreePoint::from(to)),
                power,
            )
        }
    };
    // Accumulated power beyond the (re-evaluated) cost is harmless; the task
    // completes on its first step after restore.
    task.set_power(power);
    Some(task)
}

pub(crate) fn point_from_array(array: [f64; 3]) -> Option<FreePoint> {
    if array.iter().all(|c| c.is_finite()) {
        Some(FreePoint::from(array))
    } else {
        None
    }
}

impl Serialize for super::SavedQuarry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        schema::QuarrySer::QuarryV1 {
            frame: volume_to_schema(self.frame),
            mining: volume_to_schema(self.mining),
            cursor: self.cursor.map(|(volume, current)| schema::CursorSer {
                volume: volume_to_schema(volume),
                current: current.into(),
            }),
            reservoir: schema::ReservoirSer::ReservoirV1 {
                capacity: self.capacity,
                stored: self.stored,
            },
            task: self.task.as_ref().map(task_to_schema),
            drill_pos: self.drill_pos.map(<[f64; 3]>::from),
            first_checked: self.first_checked,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for super::SavedQuarry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let schema::QuarrySer::QuarryV1 {
            frame,
            mining,
            cursor,
            reservoir,
            task,
            drill_pos,
            first_checked,
        } = schema::QuarrySer::deserialize(deserializer)?;
        let schema::ReservoirSer::ReservoirV1 { capacity, stored } = reservoir;
        let cursor = match cursor {
            None => None,
            Some(schema::CursorSer { volume, current }) => Some((
                volume_from_schema::<D::Error>(volume)?,
                Cube::from(current),
            )),
        };
        Ok(Self {
            frame: volume_from_schema::<D::Error>(frame)?,
            mining: volume_from_schema::<D::Error>(mining)?,
            cursor,
            capacity,
            stored,
            task: task.and_then(task_from_schema),
            drill_pos: drill_pos.and_then(point_from_array),
            first_checked,
        })
    }
}
