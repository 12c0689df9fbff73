use core::fmt;

use crate::math::{FreeCoordinate, FreePoint, FreeVector};

/// Axis-Aligned Box data type, with continuous coordinates.
///
/// The discrete analogue is [`Volume`](crate::math::Volume). The quarry uses
/// `Aab`s for the gantry collision beams and for the item-sweep region around a
/// broken cell.
#[derive(Copy, Clone, PartialEq)]
pub struct Aab {
    lower_bounds: FreePoint,
    upper_bounds: FreePoint,
}

impl Aab {
    /// The [`Aab`] of zero size at the origin.
    pub const ZERO: Aab = Aab {
        lower_bounds: FreePoint::new(0., 0., 0.),
        upper_bounds: FreePoint::new(0., 0., 0.),
    };

    /// Constructs an [`Aab`] from most-negative and most-positive corner points.
    ///
    /// Panics if the points are misordered or NaN.
    #[inline]
    #[track_caller]
    pub fn from_lower_upper(
        lower_bounds: impl Into<FreePoint>,
        upper_bounds: impl Into<FreePoint>,
    ) -> Self {
        let lower_bounds = lower_bounds.into();
        let upper_bounds = upper_bounds.into();
        assert!(
            lower_bounds.x <= upper_bounds.x
                && lower_bounds.y <= upper_bounds.y
                && lower_bounds.z <= upper_bounds.z,
            "invalid AAB points that are misordered or NaN: \
                lower {lower_bounds:?} upper {upper_bounds:?}"
        );
        Self {
            lower_bounds,
            upper_bounds,
        }
    }

    /// Constructs the smallest [`Aab`] containing both points (in any order),
    /// then inflates it by `radius` on every axis.
    ///
    /// This is the shape of a square-cross-section beam between two points, which
    /// is how the quarry's gantry arms and drill column are modeled.
    #[inline]
    pub fn around_segment(a: FreePoint, b: FreePoint, radius: FreeCoordinate) -> Self {
        Self::from_lower_upper(a.min(b), a.max(b)).expanded(radius)
    }

    /// Returns the most negative corner.
    #[inline]
    pub fn lower_bounds(&self) -> FreePoint {
        self.lower_bounds
    }

    /// Returns the most positive corner.
    #[inline]
    pub fn upper_bounds(&self) -> FreePoint {
        self.upper_bounds
    }

    /// Returns this box enlarged by `distance` on all six faces.
    ///
    /// Negative distances are not supported (they could invert the box).
    #[inline]
    #[must_use]
    pub fn expanded(self, distance: FreeCoordinate) -> Self {
        debug_assert!(distance >= 0.0);
        let d = FreeVector::new(distance, distance, distance);
        Self {
            lower_bounds: self.lower_bounds - d,
            upper_bounds: self.upper_bounds + d,
        }
    }

    /// Returns whether the given point is within (inclusively) this box.
    #[inline]
    pub fn contains(&self, point: FreePoint) -> bool {
        self.lower_bounds.x <= point.x
            && point.x <= self.upper_bounds.x
            && self.lower_bounds.y <= point.y
            && point.y <= self.upper_bounds.y
            && self.lower_bounds.z <= point.z
            && point.z <= self.upper_bounds.z
    }
}

impl fmt::Debug for Aab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            lower_bounds: l,
            upper_bounds: u,
        } = self;
        write!(
            f,
            "Aab({:?} to {:?}, {:?} to {:?}, {:?} to {:?})",
            l.x, u.x, l.y, u.y, l.z, u.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn around_segment_orders_and_inflates() {
        let a = FreePoint::new(5.0, 9.0, 1.0);
        let b = FreePoint::new(1.0, 9.0, 4.0);
        let aab = Aab::around_segment(a, b, 0.25);
        assert_eq!(aab.lower_bounds(), FreePoint::new(0.75, 8.75, 0.75));
        assert_eq!(aab.upper_bounds(), FreePoint::new(5.25, 9.25, 4.25));
    }

    #[test]
    #[should_panic(expected = "misordered or NaN")]
    fn misordered_rejected() {
        let _ = Aab::from_lower_upper(FreePoint::new(1.0, 0.0, 0.0), FreePoint::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn contains_is_inclusive() {
        let aab = Aab::from_lower_upper(FreePoint::new(0.0, 0.0, 0.0), FreePoint::new(1.0, 2.0, 3.0));
        assert!(aab.contains(FreePoint::new(1.0, 2.0, 3.0)));
        assert!(!aab.contains(FreePoint::new(1.0, 2.0, 3.0001)));
    }
}
