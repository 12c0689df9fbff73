use core::fmt;

use crate::math::{Aab, FreeCoordinate, FreePoint, GridCoordinate, GridPoint, GridVector};

/// “A cube”, in this crate, is a unit cube whose corners' coordinates are integers.
/// This type identifies such a cube by the coordinates of its most negative corner.
///
/// Considered in continuous space, the ranges of coordinates a cube contains are
/// half-open intervals: lower inclusive and upper exclusive.
///
/// This dedicated type exists to avoid confusion between points (zero size) and
/// cubes (unit size), which causes off-by-one errors, and to carry convenient
/// operations that are not natural operations on points.
#[derive(Clone, Copy, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[GridCoordinate; 3]", into = "[GridCoordinate; 3]")]
#[allow(missing_docs)]
pub struct Cube {
    pub x: GridCoordinate,
    pub y: GridCoordinate,
    pub z: GridCoordinate,
}

impl Cube {
    /// Equal to `Cube::new(0, 0, 0)`.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Construct `Cube { x, y, z }` from the given coordinates.
    #[inline]
    pub const fn new(x: GridCoordinate, y: GridCoordinate, z: GridCoordinate) -> Self {
        Self { x, y, z }
    }

    /// Returns the corner of this cube with the most negative coordinates.
    #[inline]
    pub fn lower_bounds(self) -> GridPoint {
        GridPoint::new(self.x, self.y, self.z)
    }

    /// Returns the corner of this cube with the most negative coordinates, as a
    /// continuous point.
    #[inline]
    pub fn free_point(self) -> FreePoint {
        FreePoint::new(
            FreeCoordinate::from(self.x),
            FreeCoordinate::from(self.y),
            FreeCoordinate::from(self.z),
        )
    }

    /// Returns the center of this cube.
    #[inline]
    pub fn center(self) -> FreePoint {
        self.free_point() + euclid::vec3(0.5, 0.5, 0.5)
    }

    /// Returns the bounding box in continuous coordinates containing this cube.
    #[inline]
    pub fn aab(self) -> Aab {
        let lower = self.free_point();
        Aab::from_lower_upper(lower, lower + euclid::vec3(1.0, 1.0, 1.0))
    }

    /// Componentwise saturating addition of a vector.
    ///
    /// The quarry's volumes are far from the coordinate limits in practice, but
    /// neighbor offsets must not panic at the numeric boundary.
    #[inline]
    #[must_use]
    pub fn saturating_add(self, v: GridVector) -> Self {
        Self::new(
            self.x.saturating_add(v.x),
            self.y.saturating_add(v.y),
            self.z.saturating_add(v.z),
        )
    }

    /// Returns this cube with its Y coordinate replaced.
    #[inline]
    #[must_use]
    pub fn with_y(self, y: GridCoordinate) -> Self {
        Self::new(self.x, y, self.z)
    }

    /// Squared Euclidean distance between the most negative corners of two cubes,
    /// computed in 64 bits so it cannot overflow.
    #[inline]
    pub fn distance_squared(self, other: Cube) -> u64 {
        fn sq(a: GridCoordinate, b: GridCoordinate) -> u64 {
            let d = i64::from(a) - i64::from(b);
            (d * d) as u64
        }
        sq(self.x, other.x) + sq(self.y, other.y) + sq(self.z, other.z)
    }
}

impl fmt::Debug for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { x, y, z } = self;
        write!(f, "({x}, {y}, {z})")
    }
}

impl From<Cube> for [GridCoordinate; 3] {
    #[inline]
    fn from(Cube { x, y, z }: Cube) -> Self {
        [x, y, z]
    }
}
impl From<[GridCoordinate; 3]> for Cube {
    #[inline]
    fn from([x, y, z]: [GridCoordinate; 3]) -> Self {
        Self { x, y, z }
    }
}
impl From<Cube> for GridPoint {
    #[inline]
    fn from(cube: Cube) -> Self {
        cube.lower_bounds()
    }
}
impl From<GridPoint> for Cube {
    #[inline]
    fn from(point: GridPoint) -> Self {
        Self::new(point.x, point.y, point.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_squared_does_not_overflow() {
        let a = Cube::new(GridCoordinate::MIN, 0, 0);
        let b = Cube::new(GridCoordinate::MAX, 0, 0);
        assert_eq!(
            a.distance_squared(b),
            (u64::from(u32::MAX)) * (u64::from(u32::MAX))
        );
    }

    #[test]
    fn aab_of_cube() {
        assert_eq!(
            Cube::new(10, 20, -30).aab(),
            Aab::from_lower_upper(
                FreePoint::new(10.0, 20.0, -30.0),
                FreePoint::new(11.0, 21.0, -29.0)
            )
        );
    }
}
