//! Numeric types used for coordinates.

use euclid::{Point3D, Vector3D};

use crate::math::Cube;

/// Coordinates that are locked to the cell grid.
pub type GridCoordinate = i32;

/// Positions that are locked to the cell grid.
///
/// The unit type parameter is [`Cube`]; the corresponding continuous type is
/// [`FreePoint`].
pub type GridPoint = Point3D<GridCoordinate, Cube>;

/// Vectors that are locked to the cell grid.
pub type GridVector = Vector3D<GridCoordinate, Cube>;

/// Coordinates that are not locked to the cell grid.
///
/// Note: these coordinates are useful for computation, but the quarry's
/// authoritative geometry is grid-aligned; only the drill position is free.
pub type FreeCoordinate = f64;

/// Positions that are not locked to the cell grid.
pub type FreePoint = Point3D<FreeCoordinate, Cube>;

/// Vectors that are not locked to the cell grid.
pub type FreeVector = Vector3D<FreeCoordinate, Cube>;
