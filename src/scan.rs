//! Deterministic traversal of the mining volume: [`ScanCursor`].

use crate::math::{Cube, Volume};

/// A restartable cursor that visits every cell of a [`Volume`] exactly once, in
/// one fixed order: X fastest, then Z, then Y, each *descending* from the maximum
/// bound. Y descending last means excavation proceeds layer by layer from the
/// top down.
///
/// The cursor holds a copy of the volume bounds it traverses, not the volume
/// itself; it is invalidated implicitly when the quarry's mining volume is
/// redefined (see [`ScanCursor::resume()`]'s identity check).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanCursor {
    volume: Volume,
    /// `None` when exhausted.
    current: Option<Cube>,
}

impl ScanCursor {
    /// Creates a cursor positioned at the first cell of the traversal (the
    /// volume's maximum corner).
    ///
    /// Returns [`None`] if the volume is uninitialized.
    pub fn new(volume: Volume) -> Option<Self> {
        let max = volume.max()?;
        Some(Self {
            volume,
            current: Some(Cube::from(max)),
        })
    }

    /// Reconstructs a cursor at an arbitrary position, as saved.
    ///
    /// Returns [`None`] if `current` is not a cell of `volume`; a cursor must
    /// never claim a position outside the volume it traverses.
    pub fn resume(volume: Volume, current: Cube) -> Option<Self> {
        if volume.contains(current) {
            Some(Self {
                volume,
                current: Some(current),
            })
        } else {
            None
        }
    }

    /// The volume this cursor traverses.
    #[inline]
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// The cell the cursor rests on, or [`None`] once the traversal is exhausted.
    #[inline]
    pub fn current(&self) -> Option<Cube> {
        self.current
    }

    /// Whether any cell (including the current one) remains.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.current.is_some()
    }

    /// Moves to the next cell in traversal order and returns it, or returns
    /// [`None`] if the traversal is exhausted. Once exhausted, the cursor stays
    /// exhausted.
    pub fn advance(&mut self) -> Option<Cube> {
        let current = self.current?;
        let (min, max) = (self.volume.min()?, self.volume.max()?);
        self.current = if current.x > min.x {
            Some(Cube::new(current.x - 1, current.y, current.z))
        } else if current.z > min.z {
            Some(Cube::new(max.x, current.y, current.z - 1))
        } else if current.y > min.y {
            Some(Cube::new(max.x, current.y - 1, max.z))
        } else {
            None
        };
        self.current
    }
}
