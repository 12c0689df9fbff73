//! Axis-aligned unit directions: the [`Face`] type.
//! This module is private but reexported by its parent.

use crate::math::GridVector;

/// Identifies a face of a cube or an orthogonal unit vector.
///
/// The quarry uses faces for two things: the direction it is mounted on (which
/// anchors the frame-build chain) and enumeration of cell neighbors.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum Face {
    /// Negative X; the face whose normal vector is `(-1, 0, 0)`.
    NX,
    /// Negative Y; the face whose normal vector is `(0, -1, 0)`; downward.
    NY,
    /// Negative Z; the face whose normal vector is `(0, 0, -1)`.
    NZ,
    /// Positive X; the face whose normal vector is `(1, 0, 0)`.
    PX,
    /// Positive Y; the face whose normal vector is `(0, 1, 0)`; upward.
    PY,
    /// Positive Z; the face whose normal vector is `(0, 0, 1)`.
    PZ,
}

impl Face {
    /// All the values of [`Face`].
    pub const ALL: [Face; 6] = [Face::NX, Face::NY, Face::NZ, Face::PX, Face::PY, Face::PZ];

    /// Returns the opposite face (maps [`NX`](Self::NX) to [`PX`](Self::PX) and so on).
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Face {
        match self {
            Face::NX => Face::PX,
            Face::NY => Face::PY,
            Face::NZ => Face::PZ,
            Face::PX => Face::NX,
            Face::PY => Face::NY,
            Face::PZ => Face::NZ,
        }
    }

    /// Returns the unit vector normal to this face, pointing away from the cube it
    /// is a face of.
    #[inline]
    pub const fn normal_vector(self) -> GridVector {
        match self {
            Face::NX => GridVector::new(-1, 0, 0),
            Face::NY => GridVector::new(0, -1, 0),
            Face::NZ => GridVector::new(0, 0, -1),
            Face::PX => GridVector::new(1, 0, 0),
            Face::PY => GridVector::new(0, 1, 0),
            Face::PZ => GridVector::new(0, 0, 1),
        }
    }
}
