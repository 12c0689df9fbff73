//! Data types which represent quarry state in formats explicitly designed for
//! serialization, and versioned to ensure ability to deserialize older data.
//!
//! As a general rule, types in this file avoid referring to types outside this
//! file. This ensures that changes to internal representations do not
//! accidentally leak into the persistent format via `#[derive(Serialize,
//! Deserialize)]`, and keeps the whole format reviewable in one place.
//!
//! General properties of the schema:
//!
//! * 3D vectors/points are represented as 3-element arrays, not structures with
//!   named fields.
//! * The replication snapshot (see [`crate::sync`]) shares [`TaskSer`] and
//!   [`VolumeSer`] so the two encodings of a task cannot drift apart.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub(crate) enum QuarrySer {
    QuarryV1 {
        frame: VolumeSer,
        mining: VolumeSer,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor: Option<CursorSer>,
        reservoir: ReservoirSer,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task: Option<TaskSer>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        drill_pos: Option<[f64; 3]>,
        first_checked: bool,
    },
}

/// Wire form of [`crate::sync::Snapshot`]. Lossy and periodic: the latest
/// snapshot supersedes any older one, so there is no delta encoding.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub(crate) enum SnapshotSer {
    SnapshotV1 {
        frame: VolumeSer,
        mining: VolumeSer,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        drill_pos: Option<[f64; 3]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task: Option<TaskSer>,
    },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub(crate) enum VolumeSer {
    VolumeV1 {
        /// `None` is the uninitialized state.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bounds: Option<BoundsSer>,
    },
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct BoundsSer {
    pub min: [i32; 3],
    /// Inclusive.
    pub max: [i32; 3],
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct CursorSer {
    /// The volume the cursor was traversing when saved; checked against the
    /// mining volume on restore.
    pub volume: VolumeSer,
    pub current: [i32; 3],
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub(crate) enum ReservoirSer {
    ReservoirV1 { capacity: u64, stored: u64 },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub(crate) enum TaskSer {
    BreakBlockV1 {
        target: [i32; 3],
        excavation: bool,
        power: u64,
    },
    PlaceFrameV1 {
        target: [i32; 3],
        power: u64,
    },
    MoveDrillV1 {
        from: [f64; 3],
        to: [f64; 3],
        power: u64,
    },
}
