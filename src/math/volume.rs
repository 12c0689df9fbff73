use core::fmt;
use core::iter::FusedIterator;

use crate::math::{Aab, Cube, FreeCoordinate, FreePoint, GridPoint, GridVector};

/// An axis-aligned box of cells with *inclusive* integer bounds and an explicit
/// initialized/uninitialized state.
///
/// An uninitialized volume contains nothing and has no bounds; this corresponds
/// to a quarry that has been placed but not yet configured. Once initialized,
/// the invariant `min ≤ max` holds componentwise.
///
/// Note the difference from a half-open box: a volume whose `min` equals its
/// `max` contains exactly one cell.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Volume {
    /// `None` means uninitialized.
    bounds: Option<(GridPoint, GridPoint)>,
}

/// Error from [`Volume::checked_from_min_max()`]: the bounds were not ordered
/// `min ≤ max` on every axis.
#[derive(Clone, Copy, Debug, Eq, PartialEq, displaydoc::Display)]
#[displaydoc("volume bounds are misordered: min {min:?} must not exceed max {max:?}")]
#[allow(missing_docs)]
pub struct MisorderedBoundsError {
    pub min: GridPoint,
    pub max: GridPoint,
}

impl core::error::Error for MisorderedBoundsError {}

impl Volume {
    /// The uninitialized volume, containing no cells.
    pub const UNINITIALIZED: Volume = Volume { bounds: None };

    /// Constructs a volume from two corner cells, in either order; the bounds are
    /// normalized componentwise.
    #[inline]
    pub fn from_min_max(a: impl Into<GridPoint>, b: impl Into<GridPoint>) -> Self {
        let a = a.into();
        let b = b.into();
        Volume {
            bounds: Some((a.min(b), b.max(a))),
        }
    }

    /// Constructs a volume from ordered corner cells.
    ///
    /// Returns [`Err`] if `min` exceeds `max` on any axis; use
    /// [`Volume::from_min_max()`] to normalize instead.
    #[inline]
    pub fn checked_from_min_max(
        min: impl Into<GridPoint>,
        max: impl Into<GridPoint>,
    ) -> Result<Self, MisorderedBoundsError> {
        let min = min.into();
        let max = max.into();
        if min.x <= max.x && min.y <= max.y && min.z <= max.z {
            Ok(Volume {
                bounds: Some((min, max)),
            })
        } else {
            Err(MisorderedBoundsError { min, max })
        }
    }

    /// Returns to the uninitialized state.
    #[inline]
    pub fn reset(&mut self) {
        self.bounds = None;
    }

    /// Whether this volume has been given bounds.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.bounds.is_some()
    }

    /// The most negative cell, or [`None`] if uninitialized.
    #[inline]
    pub fn min(&self) -> Option<GridPoint> {
        self.bounds.map(|(min, _)| min)
    }

    /// The most positive cell (inclusive), or [`None`] if uninitialized.
    #[inline]
    pub fn max(&self) -> Option<GridPoint> {
        self.bounds.map(|(_, max)| max)
    }

    /// The number of cells along each axis; zero vector if uninitialized.
    #[inline]
    pub fn size(&self) -> GridVector {
        match self.bounds {
            None => GridVector::new(0, 0, 0),
            Some((min, max)) => (max - min) + GridVector::new(1, 1, 1),
        }
    }

    /// Whether the given cell lies within this volume (bounds inclusive).
    #[inline]
    pub fn contains(&self, cube: Cube) -> bool {
        match self.bounds {
            None => false,
            Some((min, max)) => {
                (min.x..=max.x).contains(&cube.x)
                    && (min.y..=max.y).contains(&cube.y)
                    && (min.z..=max.z).contains(&cube.z)
            }
        }
    }

    /// Whether the given cell lies on one of the twelve edges of this volume:
    /// contained, and touching the minimum or maximum bound on at least two
    /// axes. These are the cells the frame lattice occupies.
    #[inline]
    pub fn on_edge(&self, cube: Cube) -> bool {
        match self.bounds {
            None => false,
            Some((min, max)) => {
                let bound_axes = usize::from(cube.x == min.x || cube.x == max.x)
                    + usize::from(cube.y == min.y || cube.y == max.y)
                    + usize::from(cube.z == min.z || cube.z == max.z);
                self.contains(cube) && bound_axes >= 2
            }
        }
    }

    /// Iterates over every cell of this volume, X slowest and Z fastest, each
    /// ascending. An uninitialized volume yields nothing.
    ///
    /// (The mining traversal order is different and deliberately so; see
    /// [`ScanCursor`](crate::scan::ScanCursor).)
    #[inline]
    pub fn cells(&self) -> VolumeIter {
        VolumeIter::new(*self)
    }

    /// Iterates over every cell satisfying [`Volume::on_edge()`], each exactly
    /// once, in the same order as [`Volume::cells()`].
    #[inline]
    pub fn edge_cells(&self) -> impl Iterator<Item = Cube> {
        let volume = *self;
        volume.cells().filter(move |&cube| volume.on_edge(cube))
    }

    /// Returns the cell of this volume closest to the given cell (componentwise
    /// clamp), or [`None`] if uninitialized.
    #[inline]
    pub fn closest_inside(&self, to: Cube) -> Option<Cube> {
        let (min, max) = self.bounds?;
        Some(Cube::new(
            to.x.clamp(min.x, max.x),
            to.y.clamp(min.y, max.y),
            to.z.clamp(min.z, max.z),
        ))
    }

    /// The continuous bounding box of this volume, spanning from `min` to
    /// `max + 1` on each axis, or [`None`] if uninitialized.
    #[inline]
    pub fn aab(&self) -> Option<Aab> {
        let (min, max) = self.bounds?;
        Some(Aab::from_lower_upper(
            FreePoint::new(min.x.into(), min.y.into(), min.z.into()),
            FreePoint::new(
                FreeCoordinate::from(max.x) + 1.0,
                FreeCoordinate::from(max.y) + 1.0,
                FreeCoordinate::from(max.z) + 1.0,
            ),
        ))
    }
}

impl fmt::Debug for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            None => write!(f, "Volume(uninitialized)"),
            Some((min, max)) => write!(
                f,
                "Volume({}..={}, {}..={}, {}..={})",
                min.x, max.x, min.y, max.y, min.z, max.z
            ),
        }
    }
}

/// Iterator produced by [`Volume::cells()`].
#[derive(Clone, Debug)]
pub struct VolumeIter {
    volume: Volume,
    /// Next cell to produce; `None` when exhausted.
    next: Option<Cube>,
}

impl VolumeIter {
    fn new(volume: Volume) -> Self {
        Self {
            volume,
            next: volume.min().map(Cube::from),
        }
    }
}

impl Iterator for VolumeIter {
    type Item = Cube;

    fn next(&mut self) -> Option<Cube> {
        let result = self.next?;
        // `self.next` is only `Some` for an initialized volume.
        let (min, max) = self.volume.bounds?;
        self.next = if result.z < max.z {
            Some(Cube::new(result.x, result.y, result.z + 1))
        } else if result.y < max.y {
            Some(Cube::new(result.x, result.y + 1, min.z))
        } else if result.x < max.x {
            Some(Cube::new(result.x + 1, min.y, min.z))
        } else {
            None
        };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match (self.next, self.volume.bounds) {
            (Some(next), Some((min, max))) => {
                let sz_y = (i64::from(max.y) - i64::from(min.y) + 1) as usize;
                let sz_z = (i64::from(max.z) - i64::from(min.z) + 1) as usize;
                let planes = (i64::from(max.x) - i64::from(next.x)) as usize;
                let rows = (i64::from(max.y) - i64::from(next.y)) as usize;
                let cells = (i64::from(max.z) - i64::from(next.z) + 1) as usize;
                planes * sz_y * sz_z + rows * sz_z + cells
            }
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for VolumeIter {}
impl FusedIterator for VolumeIter {}
