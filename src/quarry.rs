//! The quarry controller: the top-level state machine that wires geometry,
//! power, self-repair, and tasks together one simulated step at a time.

use crate::math::{
    Aab, Cube, Face, FreeCoordinate, FreePoint, GridCoordinate, GridPoint, Volume,
};
use crate::power::{Power, PowerReservoir, DEFAULT_CAPACITY};
use crate::scan::ScanCursor;
use crate::task::{Task, TaskContext, TaskStatus};
use crate::world::{ChunkPos, World};

pub(crate) mod repair;
use repair::RepairScanner;


/// Mining footprint (in cells per horizontal axis) at which the quarry is
/// considered to have taken on the maximum configurable job, for the completion
/// signal.
pub const MAX_MINING_SPAN: GridCoordinate = 64;

/// Half-thickness of the gantry arms and drill column collision beams.
const BEAM_RADIUS: FreeCoordinate = 0.25;

/// What a [`Quarry::step()`] asks its caller to do.
///
/// These are the controller's one-way signals to external collaborators; the
/// core holds no callbacks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct StepOutcome {
    /// The render-relevant state changed; observers should receive a fresh
    /// [`Snapshot`](crate::sync::Snapshot).
    pub render_changed: bool,
    /// The quarry has exhausted a maximum-span excavation; the achievement
    /// collaborator should unlock its completion notice for the owner.
    pub completed: bool,
}

/// The autonomous excavation machine's complete authoritative state.
///
/// One instance corresponds to one placed machine. Drive it by calling
/// [`step()`](Self::step) once per simulated step and
/// [`notify_cell_changed()`](Self::notify_cell_changed) whenever the world
/// reports a block change; both run synchronously on the caller's thread.
#[derive(Debug)]
pub struct Quarry {
    /// The cell the machine itself occupies.
    station: Cube,
    /// Direction from the station toward the frame.
    frame_side: Face,
    frame: Volume,
    mining: Volume,
    cursor: Option<ScanCursor>,
    reservoir: PowerReservoir,
    task: Option<Task>,
    drill_pos: Option<FreePoint>,
    repair: RepairScanner,
    /// Lazily derived from the frame volume and drill position; `None` when
    /// stale or inapplicable.
    collision: Option<[Aab; 3]>,
}

impl Quarry {
    /// Creates an unconfigured quarry at `station`, mounted with its frame
    /// opening toward `frame_side`, with the default reservoir capacity.
    ///
    /// Both volumes start uninitialized; nothing happens until
    /// [`configure()`](Self::configure) is called.
    pub fn new(station: Cube, frame_side: Face) -> Self {
        Self {
            station,
            frame_side,
            frame: Volume::UNINITIALIZED,
            mining: Volume::UNINITIALIZED,
            cursor: None,
            reservoir: PowerReservoir::new(DEFAULT_CAPACITY),
            task: None,
            drill_pos: None,
            repair: RepairScanner::new(station),
            collision: None,
        }
    }

    /// Defines the frame volume from two corner cells (normalized), derives the
    /// mining volume, and restarts all work.
    ///
    /// The frame is forced to a height of at least 4 cells. The mining volume is
    /// the frame shrunk by one cell on X and Z and on the top face, with its
    /// floor at `floor_y` (the world's lowest excavable level).
    pub fn configure(
        &mut self,
        a: impl Into<GridPoint>,
        b: impl Into<GridPoint>,
        floor_y: GridCoordinate,
    ) {
        let a = a.into();
        let b = b.into();
        let (min, mut max) = (a.min(b), a.max(b));
        if max.y - min.y < 4 {
            max.y = min.y + 4;
        }
        self.frame = Volume::from_min_max(min, max);
        self.mining = Volume::from_min_max(
            GridPoint::new(min.x + 1, floor_y, min.z + 1),
            GridPoint::new(max.x - 1, max.y - 1, max.z - 1),
        );
        log::debug!(
            "quarry at {:?} configured: frame {:?}, mining {:?}",
            self.station,
            self.frame,
            self.mining
        );
        self.cursor = None;
        self.task = None;
        self.drill_pos = None;
        self.collision = None;
        self.repair.reconfigure(self.frame, self.frame_side);
    }

    /// Configures the default 11×5×11 frame extending away from the station on
    /// its mounted side, as used when no explicit volume is provided at
    /// placement.
    pub fn configure_default(&mut self, floor_y: GridCoordinate) {
        let p = self.station.lower_bounds();
        let (a, b) = match self.frame_side {
            Face::PX => (p + euclid::vec3(1, 0, -5), p + euclid::vec3(11, 4, 5)),
            Face::NX => (p + euclid::vec3(-11, 0, -5), p + euclid::vec3(-1, 4, 5)),
            Face::PZ => (p + euclid::vec3(-5, 0, 1), p + euclid::vec3(5, 4, 11)),
            Face::NZ => (p + euclid::vec3(-5, 0, -11), p + euclid::vec3(5, 4, -1)),
            // Vertical mounting has no sensible default; mirror the +X case.
            Face::PY | Face::NY => (p + euclid::vec3(1, 0, -5), p + euclid::vec3(11, 4, 5)),
        };
        self.configure(a, b, floor_y);
    }

    /// The cell the machine occupies.
    pub fn station(&self) -> Cube {
        self.station
    }

    /// Direction from the station toward the frame.
    pub fn frame_side(&self) -> Face {
        self.frame_side
    }

    /// The outer shell the machine maintains as an intact perimeter.
    pub fn frame_volume(&self) -> Volume {
        self.frame
    }

    /// The inner region being excavated.
    pub fn mining_volume(&self) -> Volume {
        self.mining
    }

    /// The externally visible location of the excavation head, if it has ever
    /// been deployed.
    pub fn drill_pos(&self) -> Option<FreePoint> {
        self.drill_pos
    }

    /// The task currently being worked, if any.
    pub fn current_task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// Read access to the energy store.
    pub fn reservoir(&self) -> &PowerReservoir {
        &self.reservoir
    }

    /// Adds externally supplied energy, saturating at capacity; returns the
    /// amount accepted. This is the whole of the external power-input surface.
    pub fn deposit_power(&mut self, amount: Power) -> Power {
        self.reservoir.deposit(amount)
    }

    /// Whether the initial full validation pass over the frame has completed.
    pub fn first_checked(&self) -> bool {
        self.repair.first_checked()
    }

    pub(crate) fn scan_cursor(&self) -> Option<&ScanCursor> {
        self.cursor.as_ref()
    }

    /// Advances the machine by one simulated step. Never blocks, never fails;
    /// always leaves the controller in a well-defined state.
    pub fn step(&mut self, world: &mut dyn World) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if !self.frame.is_initialized() || !self.mining.is_initialized() {
            return outcome;
        }

        self.repair.run_batch(world);

        // An active task consumes the whole step.
        if let Some(mut task) = self.task.take() {
            let budget = self.reservoir.throttled_ceiling();
            let power = self.reservoir.withdraw(budget);
            let was_move = matches!(task, Task::MoveDrill(_));
            let status = task.add_power(
                power,
                &mut TaskContext {
                    world,
                    reservoir: &mut self.reservoir,
                    drill_pos: &mut self.drill_pos,
                },
            );
            match status {
                TaskStatus::InProgress => self.task = Some(task),
                TaskStatus::Complete => {
                    log::trace!("task complete: {task:?}");
                    if was_move {
                        // The drill has settled at a new resting point.
                        self.collision = None;
                    }
                }
            }
            outcome.render_changed = true;
            return outcome;
        }

        // Bootstrap: do not start work until the frame has been validated once.
        if !self.repair.first_checked() {
            return outcome;
        }

        // Structural clearing comes before everything else.
        if let Some(cube) = self.repair.nearest_clear() {
            if world.minable(cube) {
                self.drill_pos = None;
                self.task = Some(Task::break_block(cube, false));
                outcome.render_changed = true;
            }
            self.repair.classify(cube, world);
            return outcome;
        }

        // Frame building, in chain order from the entry point outward.
        if self.repair.any_place_pending() {
            for i in 0..self.repair.chain().len() {
                let cube = self.repair.chain()[i];
                if !self.repair.place_pending(cube) {
                    continue;
                }
                // Revalidate just before committing; the queue may be stale.
                self.repair.classify(cube, world);
                if !self.repair.place_pending(cube) {
                    continue;
                }
                self.drill_pos = None;
                self.task = Some(Task::place_frame(cube));
                outcome.render_changed = true;
                return outcome;
            }
            // Every queued cell reclassified as satisfied; fall through.
        }

        // Excavation.
        if self.cursor.is_none() || self.drill_pos.is_none() {
            let Some(mut cursor) = ScanCursor::new(self.mining) else {
                return outcome;
            };
            skip_ineligible(world, self.mining, &mut cursor);
            self.cursor = Some(cursor);
            self.drill_pos = self
                .mining
                .closest_inside(self.station)
                .map(Cube::free_point);
        }
        if let Some(cursor) = &mut self.cursor {
            skip_ineligible(world, self.mining, cursor);
            if let Some(next) = cursor.current() {
                let drill = self.drill_pos.unwrap_or_else(|| next.free_point());
                let target = next.free_point();
                let d = target - drill;
                if d.x * d.x + d.y * d.y + d.z * d.z >= 1.0 {
                    self.task = Some(Task::move_drill(drill, target));
                } else {
                    self.task = Some(Task::break_block(next, true));
                }
                outcome.render_changed = true;
            } else if self.mining.size().x == MAX_MINING_SPAN
                && self.mining.size().z == MAX_MINING_SPAN
            {
                // Nothing left to dig in a maximum-span volume.
                outcome.completed = true;
            }
        }
        outcome
    }

    /// Folds an external world change at `cube` into the quarry's plans. Call
    /// whenever the world reports that the cell's block changed, from the same
    /// logical thread that calls [`step()`](Self::step).
    ///
    /// Inside the frame volume this triggers an immediate reclassification.
    /// Inside the mining volume it may rebase the scan cursor so that a newly
    /// relevant cell at or above the current mining level is not skipped; the
    /// cursor never rewinds past cells it has already passed.
    pub fn notify_cell_changed(&mut self, cube: Cube, world: &dyn World) {
        if !self.frame.is_initialized() || !self.mining.is_initialized() {
            return;
        }
        if self.frame.contains(cube) {
            self.repair.classify(cube, world);
        } else if self.mining.contains(cube) {
            let Some(cursor) = &self.cursor else { return };
            let above_current = match cursor.current() {
                None => true,
                Some(current) => cube.y >= current.y,
            };
            if above_current
                && !world.passable(cube)
                && world.minable(cube)
                && reachable_from_above(world, self.mining, cube)
            {
                // Scan forward from the start; adopt the mutated cell as the new
                // cursor unless we would pass the existing cursor's position.
                let Some(mut fresh) = ScanCursor::new(self.mining) else {
                    return;
                };
                while fresh.current() != Some(cube) {
                    if fresh.advance().is_none() {
                        return;
                    }
                    if fresh.current() == cursor.current() {
                        return;
                    }
                }
                log::trace!("scan cursor rebased to {cube:?}");
                self.cursor = Some(fresh);
            }
        }
    }

    /// The three collision boxes of the deployed rig: the two gantry arms
    /// crossing the frame top at the drill, and the drill column itself.
    ///
    /// Empty when the frame is not configured or the drill has never deployed.
    /// The result is cached until the drill settles at a new resting point.
    pub fn collision_boxes(&mut self) -> &[Aab] {
        let (Some(min), Some(max), Some(drill)) = (self.frame.min(), self.frame.max(), self.drill_pos)
        else {
            return &[];
        };
        if self.collision.is_none() {
            let top = FreeCoordinate::from(max.y) + 0.5;
            let low = FreePoint::new(
                FreeCoordinate::from(min.x) + 0.5,
                top,
                FreeCoordinate::from(min.z) + 0.5,
            );
            let high = FreePoint::new(
                FreeCoordinate::from(max.x) + 0.5,
                top,
                FreeCoordinate::from(max.z) + 0.5,
            );

            let x_arm = Aab::around_segment(
                FreePoint::new(drill.x + 0.5, low.y, low.z),
                FreePoint::new(drill.x + 0.5, high.y, high.z),
                BEAM_RADIUS,
            );
            let z_arm = Aab::around_segment(
                FreePoint::new(low.x, low.y, drill.z + 0.5),
                FreePoint::new(high.x, high.y, drill.z + 0.5),
                BEAM_RADIUS,
            );
            let head = drill + euclid::vec3(0.5, 0.0, 0.5);
            let column = Aab::around_segment(head, FreePoint::new(head.x, top, head.z), BEAM_RADIUS);

            self.collision = Some([x_arm, z_arm, column]);
        }
        self.collision.as_ref().map_or(&[], |boxes| &boxes[..])
    }

    /// The chunks the keep-alive collaborator should hold loaded for this
    /// quarry: the mining volume's full footprint. Empty when unconfigured.
    pub fn chunks_to_load(&self) -> Vec<ChunkPos> {
        let (Some(min), Some(max)) = (self.mining.min(), self.mining.max()) else {
            return Vec::new();
        };
        let mut chunks = Vec::new();
        for x in (min.x >> 4)..=(max.x >> 4) {
            for z in (min.z >> 4)..=(max.z >> 4) {
                chunks.push(ChunkPos { x, z });
            }
        }
        chunks
    }

    /// Human-readable state dump for debug overlays.
    pub fn debug_info(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "reservoir = {} / {}",
                self.reservoir.stored(),
                self.reservoir.capacity()
            ),
            format!("frame = {:?}", self.frame),
            format!("mining = {:?}", self.mining),
            format!(
                "cursor = {:?}",
                self.cursor.as_ref().and_then(ScanCursor::current)
            ),
        ];
        match &self.task {
            Some(task) => lines.push(format!("task = {task:?} (power {})", task.power())),
            None => lines.push("task = none".to_owned()),
        }
        lines.push(format!("drill = {:?}", self.drill_pos));
        lines
    }

    // Accessors for the save codec.

    pub(crate) fn state_for_save(&self) -> crate::save::SavedQuarry {
        crate::save::SavedQuarry {
            frame: self.frame,
            mining: self.mining,
            cursor: self
                .cursor
                .as_ref()
                .and_then(|c| c.current().map(|current| (c.volume(), current))),
            capacity: self.reservoir.capacity(),
            stored: self.reservoir.stored(),
            task: self.task.clone(),
            drill_pos: self.drill_pos,
            first_checked: self.repair.first_checked(),
        }
    }

    pub(crate) fn apply_saved(&mut self, saved: crate::save::SavedQuarry) {
        self.frame = saved.frame;
        self.mining = saved.mining;
        self.reservoir = PowerReservoir::with_stored(saved.capacity, saved.stored);
        self.task = saved.task;
        self.drill_pos = saved.drill_pos;
        self.collision = None;
        // The work lists are not persisted; rebuild them, then reapply the
        // validation flag the save recorded.
        self.repair.reconfigure(self.frame, self.frame_side);
        self.repair.force_first_checked(saved.first_checked);
        self.cursor = saved.cursor.and_then(|(volume, current)| {
            if volume == self.mining {
                ScanCursor::resume(volume, current)
            } else {
                // The cursor belongs to a differently-shaped campaign; a fresh
                // one will be created on the next excavation step.
                None
            }
        });
    }
}

/// Advances the cursor past every cell that is not currently worth drilling:
/// passable (air or thin fluid), unminable, or not reachable from directly
/// above.
fn skip_ineligible(world: &dyn World, mining: Volume, cursor: &mut ScanCursor) {
    while let Some(cube) = cursor.current() {
        let eligible = !world.passable(cube)
            && world.minable(cube)
            && reachable_from_above(world, mining, cube);
        if eligible || cursor.advance().is_none() {
            break;
        }
    }
}

/// Whether the whole column from the mining ceiling down to just above `cube`
/// is passable, i.e. the drill can descend onto the cell.
fn reachable_from_above(world: &dyn World, mining: Volume, cube: Cube) -> bool {
    let Some(max) = mining.max() else {
        return false;
    };
    ((cube.y + 1)..=max.y).all(|y| world.passable(cube.with_y(y)))
}
