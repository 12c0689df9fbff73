//! The background process that keeps the frame intact: round-robin
//! classification of every frame cell, and the two work queues it feeds.

use std::collections::{BTreeSet, VecDeque};

use hashbrown::HashSet;

use crate::math::{Cube, Face, GridCoordinate, Volume};
use crate::world::World;

/// Cells reclassified per step until one full pass over the frame has completed.
const BOOTSTRAP_CHECKS_PER_STEP: usize = 50;
/// Cells reclassified per step afterwards (steady-state drift detection).
const STEADY_CHECKS_PER_STEP: usize = 10;

/// Entry in the clear queue, ordered by squared distance to the station so that
/// the nearest obstruction is always cleared first.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
struct ClearEntry {
    distance_squared: u64,
    cube: [GridCoordinate; 3],
}

impl ClearEntry {
    fn new(station: Cube, cube: Cube) -> Self {
        Self {
            distance_squared: station.distance_squared(cube),
            cube: cube.into(),
        }
    }

    fn cube(self) -> Cube {
        self.cube.into()
    }
}

/// Round-robin checker over every cell of the frame volume, classifying each as
/// “needs clearing”, “needs a frame block”, or “satisfied”, and maintaining the
/// corresponding work queues.
///
/// Owned exclusively by the controller; reset whenever the volumes are
/// (re)configured.
#[derive(Clone, Debug)]
pub(crate) struct RepairScanner {
    station: Cube,
    frame: Volume,
    /// The frame-build chain: every lattice cell, ordered outward from the
    /// entry point so placement never leaves an unreachable gap.
    chain: Vec<Cube>,
    /// Rotation of all frame cells awaiting (re)classification.
    to_check: VecDeque<Cube>,
    frame_cell_count: usize,
    /// Distinct cells classified so far, tracked only until the first full pass.
    first_checked_cells: HashSet<Cube>,
    first_checked: bool,
    clear_queue: BTreeSet<ClearEntry>,
    place_queue: HashSet<Cube>,
}

impl RepairScanner {
    /// Creates an empty scanner for an unconfigured quarry.
    pub(crate) fn new(station: Cube) -> Self {
        Self {
            station,
            frame: Volume::UNINITIALIZED,
            chain: Vec::new(),
            to_check: VecDeque::new(),
            frame_cell_count: 0,
            first_checked_cells: HashSet::new(),
            first_checked: false,
            clear_queue: BTreeSet::new(),
            place_queue: HashSet::new(),
        }
    }

    /// Discards all classification state and rebuilds the work list and frame
    /// chain for the given frame volume.
    pub(crate) fn reconfigure(&mut self, frame: Volume, frame_side: Face) {
        self.frame = frame;
        self.chain = build_chain(frame, self.station, frame_side);
        self.to_check = frame.cells().collect();
        self.frame_cell_count = self.to_check.len();
        self.first_checked_cells.clear();
        self.first_checked = false;
        self.clear_queue.clear();
        self.place_queue.clear();
    }

    /// Whether one full pass over the frame has completed since the last
    /// (re)configuration or [`force_first_checked`](Self::force_first_checked).
    pub(crate) fn first_checked(&self) -> bool {
        self.first_checked
    }

    /// Overrides the first-pass flag, for restoring saved state.
    pub(crate) fn force_first_checked(&mut self, value: bool) {
        self.first_checked = value;
        if value {
            self.first_checked_cells.clear();
        }
    }

    /// The frame-build chain, in placement order.
    pub(crate) fn chain(&self) -> &[Cube] {
        &self.chain
    }

    /// The nearest cell awaiting clearing, if any. The entry stays queued;
    /// reclassification after the break removes it.
    pub(crate) fn nearest_clear(&self) -> Option<Cube> {
        self.clear_queue.first().map(|entry| entry.cube())
    }

    pub(crate) fn any_place_pending(&self) -> bool {
        !self.place_queue.is_empty()
    }

    pub(crate) fn place_pending(&self, cube: Cube) -> bool {
        self.place_queue.contains(&cube)
    }

    /// Reclassifies up to the per-step batch of cells from the front of the work
    /// list, rotating each to the back.
    pub(crate) fn run_batch(&mut self, world: &dyn World) {
        if self.to_check.is_empty() {
            return;
        }
        let batch = if self.first_checked {
            STEADY_CHECKS_PER_STEP
        } else {
            BOOTSTRAP_CHECKS_PER_STEP
        };
        for _ in 0..batch {
            let Some(cube) = self.to_check.pop_front() else {
                break;
            };
            self.classify(cube, world);
            self.to_check.push_back(cube);
        }
    }

    /// Re-classifies one cell, updating both queues. Idempotent: any stale queue
    /// entry for the cell is removed first.
    pub(crate) fn classify(&mut self, cube: Cube, world: &dyn World) {
        self.clear_queue.remove(&ClearEntry::new(self.station, cube));
        self.place_queue.remove(&cube);

        if self.frame.on_edge(cube) {
            if !world.is_frame(cube) {
                if !world.is_air(cube) {
                    self.clear_queue.insert(ClearEntry::new(self.station, cube));
                } else {
                    self.place_queue.insert(cube);
                }
            }
        } else if !world.is_air(cube) {
            // Interior frame cell holding a stray block, e.g. left over from a
            // merged or resized volume.
            self.clear_queue.insert(ClearEntry::new(self.station, cube));
        }

        if !self.first_checked {
            self.first_checked_cells.insert(cube);
            if self.first_checked_cells.len() >= self.frame_cell_count {
                log::debug!("frame validation pass complete ({} cells)", self.frame_cell_count);
                self.first_checked = true;
                self.first_checked_cells.clear();
            }
        }
    }
}

/// Computes the frame-build chain: every edge cell of `frame` exactly once,
/// starting adjacent to the station on the side it is mounted on, each
/// subsequent cell face-adjacent to an earlier one, ties broken by lowest
/// squared distance to the station.
fn build_chain(frame: Volume, station: Cube, frame_side: Face) -> Vec<Cube> {
    let mut edge: Vec<Cube> = frame.edge_cells().collect();
    if edge.is_empty() {
        return edge;
    }
    // Deterministic: distance first, then coordinates.
    edge.sort_by_key(|&c| (station.distance_squared(c), <[GridCoordinate; 3]>::from(c)));

    let entry = station.saturating_add(frame_side.normal_vector());
    let seed = if frame.on_edge(entry) {
        entry
    } else {
        // The mounted face does not touch the lattice (unusual placement);
        // grow from the nearest edge cell instead.
        edge[0]
    };

    let mut chain = Vec::with_capacity(edge.len());
    let mut chained: HashSet<Cube> = HashSet::with_capacity(edge.len());
    chain.push(seed);
    chained.insert(seed);

    while chain.len() < edge.len() {
        let next = edge.iter().copied().find(|&candidate| {
            !chained.contains(&candidate)
                && Face::ALL.iter().any(|face| {
                    chained.contains(&candidate.saturating_add(face.normal_vector()))
                })
        });
        match next {
            Some(cube) => {
                chain.push(cube);
                chained.insert(cube);
            }
            // No remaining edge cell touches the chain; the frame lattice is
            // face-connected, so this is unreachable, but do not loop forever.
            None => break,
        }
    }
    chain
}
